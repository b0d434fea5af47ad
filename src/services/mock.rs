// Mock document and signature services
// Jobs finish after a random delay on a worker thread with a random outcome

use crate::state::{DocumentStatus, SignatureStatus};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// Result of a finished mock job
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    /// A document conversion finished
    Conversion {
        /// Document that was converted
        document_id: String,
        /// `Converted` or `Failed`
        status: DocumentStatus,
    },
    /// A signature request reached a terminal state
    Signature {
        /// Request that resolved
        signature_id: String,
        /// `Signed`, `Declined` or `Expired`
        status: SignatureStatus,
    },
}

const SIGNATURE_OUTCOMES: [SignatureStatus; 4] = [
    SignatureStatus::Signed,
    SignatureStatus::Signed,
    SignatureStatus::Declined,
    SignatureStatus::Expired,
];

/// Pick a conversion outcome; four in five succeed
pub fn random_conversion_outcome<R: Rng + ?Sized>(rng: &mut R) -> DocumentStatus {
    if rng.gen_bool(0.8) {
        DocumentStatus::Converted
    } else {
        DocumentStatus::Failed
    }
}

/// Pick a terminal signature outcome
pub fn random_signature_outcome<R: Rng + ?Sized>(rng: &mut R) -> SignatureStatus {
    SIGNATURE_OUTCOMES
        .choose(rng)
        .copied()
        .unwrap_or(SignatureStatus::Signed)
}

/// Runs mock jobs on worker threads and collects their results
pub struct MockServices {
    tx: Sender<JobUpdate>,
    rx: Receiver<JobUpdate>,
    min_delay_ms: u64,
    max_delay_ms: u64,
    in_flight: usize,
}

impl MockServices {
    /// Jobs take between 0.8 and 2.5 seconds
    pub fn new() -> Self {
        Self::with_delay(800, 2500)
    }

    /// Jobs take between `min_ms` and `max_ms` milliseconds
    pub fn with_delay(min_ms: u64, max_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            min_delay_ms: min_ms.min(max_ms),
            max_delay_ms: max_ms.max(min_ms),
            in_flight: 0,
        }
    }

    /// Number of jobs started but not yet collected
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn spawn(&mut self, job: impl FnOnce() -> JobUpdate + Send + 'static) {
        let tx = self.tx.clone();
        let delay = rand::thread_rng().gen_range(self.min_delay_ms..=self.max_delay_ms);
        self.in_flight += 1;

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(delay));
            // The receiver only goes away when the app closes
            let _ = tx.send(job());
        });
    }

    /// Start converting a document
    pub fn start_conversion(&mut self, document_id: String) {
        self.spawn(move || JobUpdate::Conversion {
            status: random_conversion_outcome(&mut rand::thread_rng()),
            document_id,
        });
    }

    /// Send a signature request and wait for the signer
    pub fn start_signature(&mut self, signature_id: String) {
        self.spawn(move || JobUpdate::Signature {
            status: random_signature_outcome(&mut rand::thread_rng()),
            signature_id,
        });
    }

    /// Collect every finished job without blocking
    pub fn poll(&mut self) -> Vec<JobUpdate> {
        let updates: Vec<JobUpdate> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(updates.len());
        updates
    }
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    fn wait_for(services: &mut MockServices, count: usize) -> Vec<JobUpdate> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut updates = Vec::new();
        while updates.len() < count && Instant::now() < deadline {
            updates.extend(services.poll());
            thread::sleep(Duration::from_millis(5));
        }
        updates
    }

    #[test]
    fn test_outcomes_are_terminal() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let conversion = random_conversion_outcome(&mut rng);
            assert!(matches!(
                conversion,
                DocumentStatus::Converted | DocumentStatus::Failed
            ));
            assert!(random_signature_outcome(&mut rng).is_terminal());
        }
    }

    #[test]
    fn test_jobs_complete() {
        let mut services = MockServices::with_delay(0, 10);
        services.start_conversion("d-1".to_string());
        services.start_signature("s-1".to_string());
        assert_eq!(services.in_flight(), 2);

        let updates = wait_for(&mut services, 2);
        assert_eq!(updates.len(), 2);
        assert_eq!(services.in_flight(), 0);
        assert!(updates.iter().any(|u| matches!(
            u,
            JobUpdate::Conversion { document_id, .. } if document_id == "d-1"
        )));
        assert!(updates.iter().any(|u| matches!(
            u,
            JobUpdate::Signature { signature_id, status } if signature_id == "s-1" && status.is_terminal()
        )));
    }
}
