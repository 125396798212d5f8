use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use validator_core::{
    update, AppState, Effect, JobId, JobResult, JobState, JobStatus, Msg, NoticeLevel,
    UploadPhase, ValidationReport, COMPLETED_MESSAGE, MISSING_INPUT_MESSAGE,
    UPLOAD_FAILED_MESSAGE, WRONG_EXTENSION_MESSAGE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn fill_form(state: AppState, file: Option<&str>, column: &str) -> AppState {
    let state = match file {
        Some(file) => update(state, Msg::FileSelected(PathBuf::from(file))).0,
        None => state,
    };
    update(state, Msg::EmailColumnChanged(column.to_string())).0
}

fn accept(state: AppState, id: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::SubmitAccepted {
            job_id: JobId::from(id),
            stored_file_name: format!("uploads\\{id}.csv"),
            submitted_at: "2024-05-01T10:00:00Z".to_string(),
        },
    )
}

fn terminal(id: &str, state: JobState) -> JobResult {
    JobResult {
        id: JobId::from(id),
        original_file_name: "server-name.csv".to_string(),
        created_at: "2024-05-01T09:59:58Z".to_string(),
        state,
        stored_file: Some("job-42.csv".to_string()),
    }
}

fn error_messages(state: &mut AppState) -> Vec<String> {
    state
        .take_notices()
        .into_iter()
        .filter(|n| n.level == NoticeLevel::Error)
        .map(|n| n.message)
        .collect()
}

#[test]
fn submit_then_poll_to_completion() {
    init_logging();
    let state = fill_form(AppState::new(), Some("/home/me/contacts.csv"), "email");

    let (state, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            path: PathBuf::from("/home/me/contacts.csv"),
            email_column: "email".to_string(),
        }]
    );
    assert!(state.is_uploading());
    assert!(state.store().is_empty());

    let (state, effects) = accept(state, "job-42");
    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            job_id: JobId::from("job-42")
        }]
    );
    assert_eq!(state.store().len(), 1);
    let optimistic = state.store().get(&JobId::from("job-42")).unwrap();
    assert_eq!(optimistic.status(), JobStatus::Processing);
    assert_eq!(optimistic.original_file_name, "contacts.csv");

    let mut state = state;
    for _ in 0..3 {
        let (next, effects) = update(
            state,
            Msg::PollProgress {
                job_id: JobId::from("job-42"),
                status: JobStatus::Processing,
            },
        );
        assert!(effects.is_empty());
        state = next;
    }
    assert_eq!(state.store().iter().next().unwrap().status(), JobStatus::Processing);

    let report = ValidationReport {
        valid: 80,
        disposable: 5,
        syntax_invalid: 3,
        dns_invalid: 2,
        report_filename: Some("reports/report-42.csv".to_string()),
        valid_filename: None,
        invalid_filename: None,
    };
    let (mut state, effects) = update(
        state,
        Msg::PollFinished {
            job_id: JobId::from("job-42"),
            result: Ok(terminal("job-42", JobState::Completed(report.clone()))),
        },
    );

    let done = state.store().get(&JobId::from("job-42")).unwrap();
    assert_eq!(done.status(), JobStatus::Completed);
    assert_eq!(done.report(), Some(&report));
    assert_eq!(done.original_file_name, "contacts.csv");
    assert_eq!(state.upload_phase(), &UploadPhase::Idle);
    assert!(!state.is_polling(&JobId::from("job-42")));
    assert_eq!(
        effects,
        vec![Effect::FetchPage {
            request_id: 1,
            page: 1,
            limit: 10
        }]
    );

    let view = state.view();
    assert_eq!(view.selected_file, None);
    assert_eq!(view.email_column, "");
    let notices = state.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, COMPLETED_MESSAGE);
}

#[test]
fn submit_without_file_is_rejected_before_any_request() {
    init_logging();
    let state = fill_form(AppState::new(), None, "email");
    let before = state.store().clone();

    let (mut state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(state.store(), &before);
    assert!(!state.is_uploading());
    assert_eq!(error_messages(&mut state), vec![MISSING_INPUT_MESSAGE]);
}

#[test]
fn submit_with_blank_column_is_rejected() {
    init_logging();
    let state = fill_form(AppState::new(), Some("contacts.csv"), "   ");

    let (mut state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(error_messages(&mut state), vec![MISSING_INPUT_MESSAGE]);
}

#[test]
fn non_csv_selection_is_refused_and_keeps_previous_file() {
    init_logging();
    let state = fill_form(AppState::new(), Some("contacts.CSV"), "email");
    let (mut state, effects) = update(state, Msg::FileSelected(PathBuf::from("notes.xlsx")));

    assert!(effects.is_empty());
    assert_eq!(state.view().selected_file.as_deref(), Some("contacts.CSV"));
    assert_eq!(error_messages(&mut state), vec![WRONG_EXTENSION_MESSAGE]);
}

#[test]
fn rejected_upload_reports_server_message_or_fallback() {
    init_logging();
    let state = fill_form(AppState::new(), Some("contacts.csv"), "email");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (mut state, effects) = update(
        state,
        Msg::SubmitRejected {
            message: Some("Email column not found".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert!(state.store().is_empty());
    assert!(!state.is_uploading());
    assert_eq!(error_messages(&mut state), vec!["Email column not found"]);

    let (state, _) = update(state, Msg::SubmitClicked);
    let (mut state, _) = update(state, Msg::SubmitRejected { message: None });
    assert_eq!(error_messages(&mut state), vec![UPLOAD_FAILED_MESSAGE]);
}

#[test]
fn second_submit_while_uploading_is_ignored() {
    init_logging();
    let state = fill_form(AppState::new(), Some("contacts.csv"), "email");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());

    let (state, _) = accept(state, "job-1");
    let (_state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
}

#[test]
fn poll_transport_error_marks_job_failed_and_keeps_form() {
    init_logging();
    let state = fill_form(AppState::new(), Some("contacts.csv"), "email");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = accept(state, "job-7");

    let (mut state, effects) = update(
        state,
        Msg::PollFinished {
            job_id: JobId::from("job-7"),
            result: Err("connection refused".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(
        state.store().get(&JobId::from("job-7")).unwrap().status(),
        JobStatus::Failed
    );
    assert!(!state.is_uploading());
    assert_eq!(state.view().selected_file.as_deref(), Some("contacts.csv"));
    assert_eq!(error_messages(&mut state).len(), 1);
}

#[test]
fn server_completion_replaces_failure_caused_by_transport_error() {
    init_logging();
    let state = fill_form(AppState::new(), Some("contacts.csv"), "email");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = accept(state, "job-7");
    let (state, _) = update(
        state,
        Msg::PollFinished {
            job_id: JobId::from("job-7"),
            result: Err("connection reset".to_string()),
        },
    );
    let id = JobId::from("job-7");

    // The service still reports it running: the local failure stands.
    let (state, _) = update(state, Msg::Refresh);
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            request_id: 1,
            entries: vec![terminal("job-7", JobState::Processing)],
            total_pages: 1,
        },
    );
    assert_eq!(state.store().get(&id).unwrap().status(), JobStatus::Failed);

    let (state, _) = update(state, Msg::Refresh);
    let report = ValidationReport {
        valid: 80,
        ..ValidationReport::default()
    };
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            request_id: 2,
            entries: vec![terminal("job-7", JobState::Completed(report))],
            total_pages: 1,
        },
    );
    let entry = state.store().get(&id).unwrap();
    assert_eq!(entry.status(), JobStatus::Completed);
    assert_eq!(entry.report().map(|r| r.valid), Some(80));
}

#[test]
fn service_reported_failure_is_not_overridden() {
    init_logging();
    let state = fill_form(AppState::new(), Some("contacts.csv"), "email");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = accept(state, "job-8");
    let (state, _) = update(
        state,
        Msg::PollFinished {
            job_id: JobId::from("job-8"),
            result: Ok(terminal("job-8", JobState::Failed)),
        },
    );

    let (state, _) = update(state, Msg::Refresh);
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            request_id: 2,
            entries: vec![terminal(
                "job-8",
                JobState::Completed(ValidationReport::default()),
            )],
            total_pages: 1,
        },
    );
    assert_eq!(
        state.store().get(&JobId::from("job-8")).unwrap().status(),
        JobStatus::Failed
    );
}

#[test]
fn failed_job_status_is_terminal() {
    init_logging();
    let state = fill_form(AppState::new(), Some("contacts.csv"), "email");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = accept(state, "job-9");

    let (state, _) = update(
        state,
        Msg::PollFinished {
            job_id: JobId::from("job-9"),
            result: Ok(terminal("job-9", JobState::Failed)),
        },
    );
    let (state, _) = update(
        state,
        Msg::PollProgress {
            job_id: JobId::from("job-9"),
            status: JobStatus::Processing,
        },
    );

    assert_eq!(
        state.store().get(&JobId::from("job-9")).unwrap().status(),
        JobStatus::Failed
    );
}

#[test]
fn accepted_submission_returns_to_first_page() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(state, Msg::Refresh);
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            request_id: 1,
            entries: Vec::new(),
            total_pages: 4,
        },
    );
    let (state, _) = update(state, Msg::PageRequested(3));
    let state = fill_form(state, Some("contacts.csv"), "email");
    let (state, _) = update(state, Msg::SubmitClicked);

    let (state, effects) = accept(state, "job-3");

    assert_eq!(state.pagination().page(), 1);
    assert_eq!(
        effects,
        vec![
            Effect::FetchPage {
                request_id: 3,
                page: 1,
                limit: 10
            },
            Effect::StartPolling {
                job_id: JobId::from("job-3")
            },
        ]
    );
}
