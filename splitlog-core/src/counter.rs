//! Metrics counter capability incremented once per leveled entry.

/// A counter partitioned by a single label.
pub trait Counter: Send + Sync {
    fn increment(&self, label: &str);
}
