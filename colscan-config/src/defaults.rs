// Default value functions

pub fn default_batch_size() -> usize {
    10_000
}

pub fn default_true() -> bool {
    true
}
