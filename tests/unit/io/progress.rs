//! Tests for per-stage progress tracking

#[cfg(test)]
mod tests {
    use stippler::io::progress::ProgressManager;

    // Tests stages are numbered in start order
    // Verified by returning the bar count instead of the index
    #[test]
    fn test_stage_indices() {
        let mut pm = ProgressManager::new();

        let grayscale = pm.start_stage("grayscale", 10);
        let transition = pm.start_stage("transition", 4);

        assert_eq!(grayscale, 0);
        assert_eq!(transition, 1);
        assert_eq!(pm.stage_count(), 2);
        pm.finish();
    }

    // Tests updates and completion of known and unknown stages
    // Verified by indexing the bar list directly
    #[test]
    fn test_update_and_complete() {
        let mut pm = ProgressManager::default();
        let stage = pm.start_stage("cyan", 5);

        pm.update(stage, 3, 120);
        pm.complete(stage, "converged");
        pm.update(7, 1, 1);
        pm.complete(7, "unknown");
        pm.finish();

        assert_eq!(pm.stage_count(), 1);
    }

    // Tests a manager with no stages can be finished
    // Verified by requiring at least one stage
    #[test]
    fn test_finish_without_stages() {
        let pm = ProgressManager::new();

        pm.finish();

        assert_eq!(pm.stage_count(), 0);
    }
}
