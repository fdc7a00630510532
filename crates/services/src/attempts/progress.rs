/// Aggregated view of attempt progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptProgress {
    pub section_total: usize,
    pub section_answered: usize,
    pub section_marked: usize,
    pub overall_total: usize,
    pub overall_answered: usize,
}
