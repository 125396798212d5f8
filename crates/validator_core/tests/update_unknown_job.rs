use std::path::PathBuf;

use validator_core::{update, AppState, JobId, JobResult, JobState, JobStatus, Msg};

fn ghost() -> JobId {
    JobId::from("never-seen")
}

#[test]
fn events_for_unknown_jobs_change_nothing() {
    let state = AppState::new();
    let messages = vec![
        Msg::PollProgress {
            job_id: ghost(),
            status: JobStatus::Processing,
        },
        Msg::PollFinished {
            job_id: ghost(),
            result: Ok(JobResult {
                id: ghost(),
                original_file_name: "ghost.csv".into(),
                created_at: String::new(),
                state: JobState::Failed,
                stored_file: None,
            }),
        },
        Msg::DeleteConfirmed { job_id: ghost() },
        Msg::DeleteFailed {
            job_id: ghost(),
            message: "gone".into(),
        },
    ];

    for msg in messages {
        let (next, effects) = update(state.clone(), msg.clone());
        assert_eq!(next, state, "{msg:?} changed state");
        assert!(effects.is_empty(), "{msg:?} produced {effects:?}");
    }
}

#[test]
fn fresh_state_is_clean() {
    let mut state = AppState::new();
    assert!(!state.consume_dirty());
    assert!(state.take_notices().is_empty());
    assert!(!state.is_uploading());
}

#[test]
fn form_edits_mark_dirty_without_effects() {
    let (mut state, effects) = update(AppState::new(), Msg::EmailColumnChanged("email".into()));
    assert!(effects.is_empty());
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, Msg::FileSelected(PathBuf::from("list.csv")));
    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    assert!(state.view().can_submit);
}
