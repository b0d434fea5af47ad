// Application state management
// Mock back-office data, role switching and UI state

/// Unique identifier for a client
pub type ClientId = String;

/// Dashboard role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Firm staff: sees every client's data
    Admin,
    /// A signed-in client: sees only their own rows
    Client,
}

/// Views reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Client list (admin only)
    Clients,
    /// Documents and conversions
    Documents,
    /// Signature requests
    Signatures,
    /// Task list
    Tasks,
    /// Projects and progress
    Projects,
    /// New client onboarding form (admin only)
    Onboarding,
}

impl View {
    /// Views available to `role`, in sidebar order
    pub fn for_role(role: Role) -> &'static [View] {
        match role {
            Role::Admin => &[
                View::Clients,
                View::Documents,
                View::Signatures,
                View::Tasks,
                View::Projects,
                View::Onboarding,
            ],
            Role::Client => &[View::Documents, View::Signatures, View::Tasks, View::Projects],
        }
    }

    /// Sidebar label
    pub fn label(self) -> &'static str {
        match self {
            View::Clients => "Clients",
            View::Documents => "Documents",
            View::Signatures => "Signatures",
            View::Tasks => "Tasks",
            View::Projects => "Projects",
            View::Onboarding => "Onboard client",
        }
    }
}

/// Client lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    /// Onboarding not finished
    Pending,
    /// Engaged client
    Active,
    /// No longer served
    Inactive,
}

/// Document conversion status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Uploaded, not converted
    Uploaded,
    /// Conversion running
    Converting,
    /// Conversion finished
    Converted,
    /// Conversion failed
    Failed,
}

/// Signature request status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Not sent yet
    Draft,
    /// Waiting for the signer
    Pending,
    /// Signed
    Signed,
    /// Signer declined
    Declined,
    /// Expired unsigned
    Expired,
}

impl SignatureStatus {
    /// Whether the request can no longer change
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SignatureStatus::Signed | SignatureStatus::Declined | SignatureStatus::Expired
        )
    }
}

/// A client of the firm
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    /// Client id
    pub id: ClientId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Lifecycle status
    pub status: ClientStatus,
}

/// A client document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id
    pub id: String,
    /// Owning client
    pub client_id: ClientId,
    /// File name
    pub name: String,
    /// Conversion status
    pub status: DocumentStatus,
}

/// A signature request on a document
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Request id
    pub id: String,
    /// Document being signed
    pub document_id: String,
    /// Owning client
    pub client_id: ClientId,
    /// Signer name
    pub signer: String,
    /// Request status
    pub status: SignatureStatus,
}

/// A to-do item
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Task id
    pub id: String,
    /// Short description
    pub title: String,
    /// Owning client
    pub client_id: ClientId,
    /// Completed flag
    pub done: bool,
}

/// An engagement tracked by progress
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Project id
    pub id: String,
    /// Display name
    pub name: String,
    /// Owning client
    pub client_id: ClientId,
    /// Completion, 0.0 to 1.0
    pub progress: f32,
}

/// UI-specific state
#[derive(Debug, Clone)]
pub struct UiState {
    /// Whether the sidebar is visible
    pub sidebar_visible: bool,
    /// Whether to show the output log
    pub terminal_visible: bool,
    /// View shown in the main area
    pub view: View,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_visible: true,
            terminal_visible: true,
            view: View::Clients,
        }
    }
}

/// Main application state
/// Holds the mock collections and the active role
#[derive(Debug, Clone)]
pub struct AppState {
    /// Active role
    pub role: Role,
    /// Client whose dashboard is shown in the client role
    pub signed_in_client: Option<ClientId>,
    /// All clients
    pub clients: Vec<Client>,
    /// All documents
    pub documents: Vec<Document>,
    /// All signature requests
    pub signatures: Vec<Signature>,
    /// All tasks
    pub tasks: Vec<Task>,
    /// All projects
    pub projects: Vec<Project>,
    /// UI state preferences
    pub ui_state: UiState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            role: Role::Admin,
            signed_in_client: None,
            clients: Vec::new(),
            documents: Vec::new(),
            signatures: Vec::new(),
            tasks: Vec::new(),
            projects: Vec::new(),
            ui_state: UiState::default(),
        }
    }
}

impl AppState {
    /// Create an empty state in the admin role
    pub fn new() -> Self {
        Self::default()
    }

    /// State pre-filled with demo data
    pub fn with_demo_data() -> Self {
        let mut state = Self::new();

        let clients = [
            ("c-100", "Ana Ruiz", "ana@example.com", ClientStatus::Active),
            ("c-101", "Bruno Díaz", "bruno@example.com", ClientStatus::Active),
            ("c-102", "Carla Méndez", "carla@example.com", ClientStatus::Pending),
        ];
        for (id, name, email, status) in clients {
            state.add_client(Client {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                status,
            });
        }

        let documents = [
            ("d-1", "c-100", "2023 tax return.pdf", DocumentStatus::Converted),
            ("d-2", "c-100", "W-2 scan.jpg", DocumentStatus::Uploaded),
            ("d-3", "c-101", "Bank statements.zip", DocumentStatus::Uploaded),
            ("d-4", "c-102", "ID card.png", DocumentStatus::Failed),
        ];
        state.documents = documents
            .into_iter()
            .map(|(id, client_id, name, status)| Document {
                id: id.to_string(),
                client_id: client_id.to_string(),
                name: name.to_string(),
                status,
            })
            .collect();

        state.signatures = vec![
            Signature {
                id: "s-1".to_string(),
                document_id: "d-1".to_string(),
                client_id: "c-100".to_string(),
                signer: "Ana Ruiz".to_string(),
                status: SignatureStatus::Signed,
            },
            Signature {
                id: "s-2".to_string(),
                document_id: "d-3".to_string(),
                client_id: "c-101".to_string(),
                signer: "Bruno Díaz".to_string(),
                status: SignatureStatus::Draft,
            },
        ];

        let tasks = [
            ("t-1", "Upload W-2", "c-100", false),
            ("t-2", "Review engagement letter", "c-101", true),
            ("t-3", "Send ID copy", "c-102", false),
        ];
        state.tasks = tasks
            .into_iter()
            .map(|(id, title, client_id, done)| Task {
                id: id.to_string(),
                title: title.to_string(),
                client_id: client_id.to_string(),
                done,
            })
            .collect();

        state.projects = vec![
            Project {
                id: "p-1".to_string(),
                name: "2023 personal return".to_string(),
                client_id: "c-100".to_string(),
                progress: 0.8,
            },
            Project {
                id: "p-2".to_string(),
                name: "LLC bookkeeping".to_string(),
                client_id: "c-101".to_string(),
                progress: 0.35,
            },
        ];

        state
    }

    /// Add a client
    /// Returns true if the client was added (false if ID already exists)
    pub fn add_client(&mut self, client: Client) -> bool {
        if self.clients.iter().any(|c| c.id == client.id) {
            false
        } else {
            self.clients.push(client);
            true
        }
    }

    /// Switch to the admin dashboard
    pub fn sign_in_as_admin(&mut self) {
        self.role = Role::Admin;
        self.signed_in_client = None;
        self.ui_state.view = View::Clients;
    }

    /// Switch to the dashboard of `client_id`
    /// Returns true if the client exists
    pub fn sign_in_as_client(&mut self, client_id: &str) -> bool {
        if !self.clients.iter().any(|c| c.id == client_id) {
            return false;
        }
        self.role = Role::Client;
        self.signed_in_client = Some(client_id.to_string());
        self.ui_state.view = View::Documents;
        true
    }

    /// Select a view; views not available to the role are ignored
    pub fn select_view(&mut self, view: View) -> bool {
        if View::for_role(self.role).contains(&view) {
            self.ui_state.view = view;
            true
        } else {
            false
        }
    }

    /// The signed-in client record, in the client role
    pub fn current_client(&self) -> Option<&Client> {
        self.signed_in_client
            .as_ref()
            .and_then(|id| self.clients.iter().find(|c| &c.id == id))
    }

    fn can_see(&self, client_id: &str) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Client => self.signed_in_client.as_deref() == Some(client_id),
        }
    }

    /// Clients visible to the active role, sorted by name
    pub fn visible_clients(&self) -> Vec<&Client> {
        let mut clients: Vec<&Client> =
            self.clients.iter().filter(|c| self.can_see(&c.id)).collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        clients
    }

    /// Documents visible to the active role
    pub fn visible_documents(&self) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| self.can_see(&d.client_id))
            .collect()
    }

    /// Signature requests visible to the active role
    pub fn visible_signatures(&self) -> Vec<&Signature> {
        self.signatures
            .iter()
            .filter(|s| self.can_see(&s.client_id))
            .collect()
    }

    /// Tasks visible to the active role
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.can_see(&t.client_id)).collect()
    }

    /// Projects visible to the active role
    pub fn visible_projects(&self) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| self.can_see(&p.client_id))
            .collect()
    }

    /// Client display name, falling back to the id
    pub fn client_name<'a>(&'a self, client_id: &'a str) -> &'a str {
        self.clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.name.as_str())
            .unwrap_or(client_id)
    }

    /// Update a document's status
    /// Returns true if the document was found and updated
    pub fn set_document_status(&mut self, id: &str, status: DocumentStatus) -> bool {
        match self.documents.iter_mut().find(|d| d.id == id) {
            Some(document) => {
                document.status = status;
                true
            }
            None => false,
        }
    }

    /// Update a signature request's status
    /// Returns true if the request was found and updated
    pub fn set_signature_status(&mut self, id: &str, status: SignatureStatus) -> bool {
        match self.signatures.iter_mut().find(|s| s.id == id) {
            Some(signature) => {
                signature.status = status;
                true
            }
            None => false,
        }
    }

    /// Flip a task's done flag
    pub fn toggle_task(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.done = !task.done;
                true
            }
            None => false,
        }
    }

    /// Record a client provisioned by the onboarding workflow
    pub fn record_onboarded_client(&mut self, id: &str, name: &str, email: &str) {
        if let Some(existing) = self.clients.iter_mut().find(|c| c.id == id) {
            existing.name = name.to_string();
            existing.email = email.to_string();
            existing.status = ClientStatus::Active;
        } else {
            self.clients.push(Client {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                status: ClientStatus::Active,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new();
        assert_eq!(state.role, Role::Admin);
        assert!(state.clients.is_empty());
        assert!(state.current_client().is_none());
    }

    #[test]
    fn test_add_client() {
        let mut state = AppState::new();
        let client = Client {
            id: "1".to_string(),
            name: "Test Client".to_string(),
            email: "t@example.com".to_string(),
            status: ClientStatus::Pending,
        };

        assert!(state.add_client(client.clone()));
        assert!(!state.add_client(client)); // Duplicate ID should fail
        assert_eq!(state.clients.len(), 1);
    }

    #[test]
    fn test_admin_sees_everything() {
        let state = AppState::with_demo_data();
        assert_eq!(state.visible_clients().len(), 3);
        assert_eq!(state.visible_documents().len(), state.documents.len());
        assert_eq!(state.visible_projects().len(), state.projects.len());
    }

    #[test]
    fn test_client_sees_only_own_rows() {
        let mut state = AppState::with_demo_data();
        assert!(state.sign_in_as_client("c-100"));

        assert_eq!(state.role, Role::Client);
        assert_eq!(state.current_client().unwrap().name, "Ana Ruiz");
        assert!(state.visible_documents().iter().all(|d| d.client_id == "c-100"));
        assert_eq!(state.visible_documents().len(), 2);
        assert_eq!(state.visible_signatures().len(), 1);
        assert_eq!(state.visible_tasks().len(), 1);
        assert_eq!(state.visible_clients().len(), 1);

        assert!(!state.sign_in_as_client("nobody"));
        assert_eq!(state.signed_in_client.as_deref(), Some("c-100"));
    }

    #[test]
    fn test_views_follow_role() {
        let mut state = AppState::with_demo_data();
        assert!(state.select_view(View::Onboarding));

        state.sign_in_as_client("c-101");
        assert_eq!(state.ui_state.view, View::Documents);
        assert!(!state.select_view(View::Onboarding));
        assert!(!state.select_view(View::Clients));
        assert!(state.select_view(View::Tasks));

        state.sign_in_as_admin();
        assert_eq!(state.role, Role::Admin);
        assert!(state.signed_in_client.is_none());
    }

    #[test]
    fn test_status_updates() {
        let mut state = AppState::with_demo_data();
        assert!(state.set_document_status("d-2", DocumentStatus::Converting));
        assert_eq!(state.documents[1].status, DocumentStatus::Converting);
        assert!(!state.set_document_status("missing", DocumentStatus::Failed));

        assert!(state.set_signature_status("s-2", SignatureStatus::Declined));
        assert!(state.signatures[1].status.is_terminal());

        assert!(state.toggle_task("t-1"));
        assert!(state.tasks[0].done);
    }

    #[test]
    fn test_record_onboarded_client() {
        let mut state = AppState::with_demo_data();
        state.record_onboarded_client("c-102", "Carla Méndez", "carla@new.example.com");
        state.record_onboarded_client("c-200", "Dario Paz", "dario@example.com");

        assert_eq!(state.clients.len(), 4);
        let carla = state.clients.iter().find(|c| c.id == "c-102").unwrap();
        assert_eq!(carla.status, ClientStatus::Active);
        assert_eq!(carla.email, "carla@new.example.com");
    }
}
