use crate::filename::{basename, has_tabular_extension};
use crate::state::{file_name_of, PendingDelete};
use crate::{
    AppState, Effect, JobId, JobPatch, JobResult, JobState, JobStatus, Msg, PageRequest,
    UploadPhase,
};

pub const MISSING_INPUT_MESSAGE: &str = "Please select a file and enter an email column";
pub const WRONG_EXTENSION_MESSAGE: &str = "Only CSV files are allowed";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";
pub const COMPLETED_MESSAGE: &str = "Validation completed successfully!";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Refresh => vec![state.pagination.refresh().into()],
        Msg::FileSelected(path) => {
            if has_tabular_extension(&file_name_of(&path)) {
                state.form.file = Some(path);
                state.mark_dirty();
            } else {
                state.notify_error(WRONG_EXTENSION_MESSAGE);
            }
            Vec::new()
        }
        Msg::EmailColumnChanged(column) => {
            state.form.email_column = column;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::SubmitAccepted {
            job_id,
            stored_file_name,
            submitted_at,
        } => {
            let original_file_name = match std::mem::take(&mut state.upload) {
                UploadPhase::Submitting { original_file_name } => original_file_name,
                _ => basename(&stored_file_name).to_string(),
            };
            // The entry must exist before the first poll can report on it.
            state.store.insert_optimistic(JobResult::optimistic(
                job_id.clone(),
                original_file_name,
                submitted_at,
            ));
            state.upload = UploadPhase::Polling {
                job_id: job_id.clone(),
            };
            state.mark_dirty();

            let mut effects = Vec::with_capacity(2);
            if let Some(request) = state.pagination.set_page(1) {
                effects.push(request.into());
            }
            if state.active_polls.insert(job_id.clone()) {
                effects.push(Effect::StartPolling { job_id });
            }
            effects
        }
        Msg::SubmitRejected { message } => {
            state.upload = UploadPhase::Idle;
            state.mark_dirty();
            state.notify_error(message.unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string()));
            Vec::new()
        }
        Msg::PollProgress { job_id, status } => {
            let progress = match status {
                JobStatus::Pending => Some(JobState::Pending),
                JobStatus::Processing => Some(JobState::Processing),
                JobStatus::Completed | JobStatus::Failed => None,
            };
            if let Some(progress) = progress.filter(|_| state.is_polling(&job_id)) {
                state.store.update_by_id(&job_id, JobPatch::state(progress));
            }
            Vec::new()
        }
        Msg::PollFinished { job_id, result } => poll_finished(&mut state, job_id, result),
        Msg::PageRequested(page) => {
            let request = state.pagination.set_page(page);
            page_change(&mut state, request)
        }
        Msg::NextPage => {
            let next = state.pagination.page().saturating_add(1);
            let request = state.pagination.set_page(next);
            page_change(&mut state, request)
        }
        Msg::PrevPage => {
            let prev = state.pagination.page().saturating_sub(1);
            let request = state.pagination.set_page(prev);
            page_change(&mut state, request)
        }
        Msg::LimitChanged(limit) => {
            let request = state.pagination.set_limit(limit);
            page_change(&mut state, request)
        }
        Msg::PageLoaded {
            request_id,
            mut entries,
            total_pages,
        } => {
            if state.pagination.accepts(request_id) {
                state.pagination.apply_total_pages(total_pages);
                entries.retain(|entry| !state.pending_deletes.contains_key(&entry.id));
                let failures = &state.transport_failures;
                state
                    .store
                    .merge_superseding(entries, |id| failures.contains(id));
                let store = &state.store;
                state.transport_failures.retain(|id| {
                    store
                        .get(id)
                        .is_some_and(|entry| entry.status() == JobStatus::Failed)
                });
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PageLoadFailed {
            request_id,
            message,
        } => {
            if state.pagination.accepts(request_id) {
                state.notify_error(format!("Failed to fetch validation results: {message}"));
            }
            Vec::new()
        }
        Msg::DeleteClicked { job_id } => delete(&mut state, job_id),
        Msg::DeleteConfirmed { job_id } => {
            state.pending_deletes.remove(&job_id);
            state.transport_failures.remove(&job_id);
            Vec::new()
        }
        Msg::DeleteFailed { job_id, message } => {
            let Some(PendingDelete {
                index,
                entry,
                window,
            }) = state.pending_deletes.remove(&job_id)
            else {
                return (state, Vec::new());
            };
            state.notify_error(format!(
                "Failed to delete {}: {message}",
                entry.original_file_name
            ));
            // The entry belongs to a page that is no longer shown.
            if window != (state.pagination.page(), state.pagination.limit()) {
                let request = state.pagination.refresh();
                return (state, vec![request.into()]);
            }
            let resumable = !entry.is_terminal();
            if state.store.restore(index, entry)
                && resumable
                && state.active_polls.insert(job_id.clone())
            {
                vec![Effect::StartPolling { job_id }]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadClicked { job_id, artifact } => state
            .store
            .get(&job_id)
            .and_then(JobResult::report)
            .and_then(|report| report.artifact(artifact))
            .map(|name| Effect::DownloadArtifact {
                filename: basename(name).to_string(),
            })
            .into_iter()
            .collect(),
        Msg::DownloadFinished { filename, result } => {
            match result {
                Ok(path) => {
                    state.notify_success(format!("Saved {filename} to {}", path.display()))
                }
                Err(message) => {
                    state.notify_error(format!("Download of {filename} failed: {message}"))
                }
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn page_change(state: &mut AppState, request: Option<PageRequest>) -> Vec<Effect> {
    match request {
        Some(request) => {
            state.mark_dirty();
            vec![request.into()]
        }
        None => Vec::new(),
    }
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if state.is_uploading() {
        return Vec::new();
    }
    let email_column = state.form.email_column.trim().to_string();
    let Some(path) = state.form.file.clone().filter(|_| !email_column.is_empty()) else {
        state.notify_error(MISSING_INPUT_MESSAGE);
        return Vec::new();
    };
    let original_file_name = file_name_of(&path);
    if !has_tabular_extension(&original_file_name) {
        state.notify_error(WRONG_EXTENSION_MESSAGE);
        return Vec::new();
    }

    state.upload = UploadPhase::Submitting { original_file_name };
    state.mark_dirty();
    vec![Effect::SubmitJob { path, email_column }]
}

fn poll_finished(
    state: &mut AppState,
    job_id: JobId,
    result: Result<JobResult, String>,
) -> Vec<Effect> {
    // A cancelled loop may still deliver one last event; it no longer counts.
    if !state.active_polls.remove(&job_id) {
        return Vec::new();
    }
    let owned_upload = state.release_upload_for(&job_id);

    match result {
        Ok(terminal) => {
            let status = terminal.status();
            let name = state
                .store
                .get(&job_id)
                .map(|entry| entry.original_file_name.clone())
                .unwrap_or_else(|| terminal.original_file_name.clone());
            state.store.update_by_id(&job_id, JobPatch::from_result(terminal));
            match status {
                JobStatus::Failed => {
                    state.notify_error(format!("Validation failed for {name}"));
                }
                _ => {
                    if owned_upload {
                        state.clear_form();
                    }
                    state.notify_success(COMPLETED_MESSAGE);
                }
            }
            // Counts and ordering come from the server, not the optimistic entry.
            vec![state.pagination.refresh().into()]
        }
        Err(message) => {
            if state.store.update_by_id(&job_id, JobPatch::state(JobState::Failed)) {
                state.transport_failures.insert(job_id.clone());
            }
            state.notify_error(format!("An error occurred while fetching results: {message}"));
            Vec::new()
        }
    }
}

fn delete(state: &mut AppState, job_id: JobId) -> Vec<Effect> {
    if state.pending_deletes.contains_key(&job_id) {
        return Vec::new();
    }
    let Some((index, entry)) = state.store.remove_by_id(&job_id) else {
        return Vec::new();
    };
    let window = (state.pagination.page(), state.pagination.limit());
    state.pending_deletes.insert(
        job_id.clone(),
        PendingDelete {
            index,
            entry,
            window,
        },
    );

    let mut effects = Vec::with_capacity(2);
    if state.active_polls.remove(&job_id) {
        state.release_upload_for(&job_id);
        effects.push(Effect::CancelPolling {
            job_id: job_id.clone(),
        });
    }
    effects.push(Effect::DeleteJob { job_id });
    effects
}
