use validator_core::{
    basename, display_title, has_tabular_extension, update, AppState, Artifact, DownloadLink,
    Effect, JobId, JobResult, JobState, JobStatus, Msg, ValidationReport,
};

fn completed_with_paths() -> JobResult {
    JobResult {
        id: JobId::from("job-42"),
        original_file_name: "Contacts.CSV".to_string(),
        created_at: "2024-05-01T10:00:00Z".to_string(),
        state: JobState::Completed(ValidationReport {
            valid: 80,
            disposable: 5,
            syntax_invalid: 3,
            dns_invalid: 2,
            report_filename: Some("C:\\data\\jobs\\report-42.csv".to_string()),
            valid_filename: Some("/srv/out/valid-42.csv".to_string()),
            invalid_filename: None,
        }),
        stored_file: None,
    }
}

fn loaded(entries: Vec<JobResult>) -> AppState {
    let (state, _) = update(AppState::new(), Msg::Refresh);
    update(
        state,
        Msg::PageLoaded {
            request_id: 1,
            entries,
            total_pages: 1,
        },
    )
    .0
}

#[test]
fn basename_handles_both_separators() {
    assert_eq!(basename("C:\\data\\jobs\\report-42.csv"), "report-42.csv");
    assert_eq!(basename("uploads/2024/report-42.csv"), "report-42.csv");
    assert_eq!(basename("mixed/dir\\report-42.csv"), "report-42.csv");
    assert_eq!(basename("report-42.csv"), "report-42.csv");
}

#[test]
fn extension_check_is_case_insensitive() {
    assert!(has_tabular_extension("contacts.csv"));
    assert!(has_tabular_extension("contacts.CSV"));
    assert!(!has_tabular_extension("contacts.csv.txt"));
    assert!(!has_tabular_extension(".csv"));
    assert!(!has_tabular_extension("contacts"));
}

#[test]
fn title_drops_csv_suffix() {
    assert_eq!(display_title("Contacts.CSV"), "Contacts");
    assert_eq!(display_title("report.xlsx"), "report.xlsx");
    assert_eq!(display_title("csv"), "csv");
}

#[test]
fn completed_row_exposes_normalized_downloads() {
    let state = loaded(vec![completed_with_paths()]);
    let view = state.view();
    let row = &view.rows[0];

    assert_eq!(row.title, "Contacts");
    assert_eq!(row.status, JobStatus::Completed);
    assert!(!row.is_in_progress());
    assert_eq!(
        row.downloads,
        vec![
            DownloadLink {
                artifact: Artifact::Report,
                filename: "report-42.csv".to_string(),
            },
            DownloadLink {
                artifact: Artifact::Valid,
                filename: "valid-42.csv".to_string(),
            },
        ]
    );
}

#[test]
fn download_click_resolves_bare_filename() {
    let state = loaded(vec![completed_with_paths()]);

    let (state, effects) = update(
        state,
        Msg::DownloadClicked {
            job_id: JobId::from("job-42"),
            artifact: Artifact::Report,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::DownloadArtifact {
            filename: "report-42.csv".to_string()
        }]
    );

    let (_state, effects) = update(
        state,
        Msg::DownloadClicked {
            job_id: JobId::from("job-42"),
            artifact: Artifact::Invalid,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn in_progress_rows_have_no_downloads() {
    let mut entry = completed_with_paths();
    entry.state = JobState::Processing;
    let state = loaded(vec![entry]);

    let view = state.view();
    assert!(view.rows[0].is_in_progress());
    assert!(view.rows[0].report.is_none());
    assert!(view.rows[0].downloads.is_empty());
}

#[test]
fn can_submit_tracks_file_and_upload() {
    let state = AppState::new();
    assert!(!state.view().can_submit);

    let (state, _) = update(state, Msg::FileSelected("contacts.csv".into()));
    assert!(state.view().can_submit);

    let (state, _) = update(state, Msg::EmailColumnChanged("email".to_string()));
    let (state, _) = update(state, Msg::SubmitClicked);
    let view = state.view();
    assert!(view.is_uploading);
    assert!(!view.can_submit);
}
