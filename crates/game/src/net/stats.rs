use super::connection::DropReason;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub dropped_malformed: u64,
    pub dropped_state: u64,
    pub dropped_sequence: u64,
    pub send_refused: u64,
}

impl SessionStats {
    pub fn record_sent(&mut self, bytes: usize) {
        self.packets_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub fn record_received(&mut self, bytes: usize) {
        self.packets_received += 1;
        self.bytes_received += bytes as u64;
    }

    pub fn record_drop(&mut self, reason: &DropReason) {
        match reason {
            DropReason::Malformed(_) => self.dropped_malformed += 1,
            DropReason::StateMismatch { .. } => self.dropped_state += 1,
            DropReason::Sequence(_) => self.dropped_sequence += 1,
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped_malformed + self.dropped_state + self.dropped_sequence
    }
}
