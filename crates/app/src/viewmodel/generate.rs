//! QR generation view model

use std::sync::Arc;

use chrono::Utc;
use qrattend_core::config::SessionConfig;
use qrattend_core::pages::generate::{
    self, duration_label, GenerateForm, GeneratedView, DURATION_OPTIONS, TEMPLATES,
};
use slint::{ComponentHandle, SharedString};
use tracing::{info, warn};

use super::{refresh_all, run_in_background, to_model};
use crate::format::local_time;
use crate::state::AppState;
use crate::{MainWindow, TemplateItem};

pub fn setup_generate_bindings(window: &MainWindow, state: Arc<AppState>) {
    let labels: Vec<SharedString> = DURATION_OPTIONS.iter().map(|o| o.label.into()).collect();
    window.set_duration_labels(to_model(labels));
    window.set_gen_duration_index(duration_index(state.config.sessions.default_duration_minutes));

    let templates: Vec<TemplateItem> = TEMPLATES
        .iter()
        .map(|t| TemplateItem {
            name: t.name.into(),
            duration: duration_label(t.duration_minutes).into(),
        })
        .collect();
    window.set_templates(to_model(templates));

    // Apply template
    let state_template = state.clone();
    let window_weak = window.as_weak();
    window.on_apply_template(move |index| {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let Some(template) = usize::try_from(index).ok().and_then(|i| TEMPLATES.get(i)) else {
            return;
        };

        let mut form = GenerateForm::new(&state_template.config.sessions);
        form.apply_template(template, Utc::now());
        w.set_gen_name(form.name.into());
        w.set_gen_code(form.code.into());
        w.set_gen_duration_index(duration_index(form.duration_minutes));
        w.set_generate_notice("".into());
    });

    // Generate
    let window_weak = window.as_weak();
    window.on_generate_qr(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let form = read_form(&w, &state.config.sessions);

        run_in_background(
            &state,
            &w,
            move |db, config| generate::generate(db, &form, &config.sessions, Utc::now()),
            |w, result| match result {
                Ok(view) => {
                    w.set_qr_payload(view.payload.clone().into());
                    w.set_qr_info(generated_info(&view).into());
                    let notice = if view.reused {
                        format!("Session {} is already active, showing its QR code", view.code)
                    } else {
                        String::new()
                    };
                    w.set_generate_notice(notice.into());
                    refresh_all(w);
                }
                Err(e) => {
                    if !e.is_validation() {
                        tracing::error!("Failed to generate QR code: {}", e);
                    }
                    w.set_generate_notice(e.to_string().into());
                }
            },
        );
    });

    // Copy payload
    let window_weak = window.as_weak();
    window.on_copy_payload(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let payload = w.get_qr_payload().to_string();
        if payload.is_empty() {
            return;
        }

        let copied =
            arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(payload));
        match copied {
            Ok(()) => {
                info!("Copied QR payload to clipboard");
                w.set_generate_notice("QR code data copied to clipboard".into());
            }
            Err(e) => {
                warn!("Clipboard unavailable: {}", e);
                w.set_generate_notice(format!("Could not copy: {e}").into());
            }
        }
    });
}

fn read_form(w: &MainWindow, config: &SessionConfig) -> GenerateForm {
    let duration_minutes = usize::try_from(w.get_gen_duration_index())
        .ok()
        .and_then(|i| DURATION_OPTIONS.get(i))
        .map(|o| o.minutes)
        .unwrap_or(config.default_duration_minutes);

    GenerateForm {
        name: w.get_gen_name().to_string(),
        code: w.get_gen_code().to_string(),
        duration_minutes,
        expiry: w.get_gen_expiry().to_string(),
        description: w.get_gen_description().to_string(),
    }
}

/// Position of `minutes` in the duration list, falling back to one hour
fn duration_index(minutes: u32) -> i32 {
    DURATION_OPTIONS
        .iter()
        .position(|o| o.minutes == minutes)
        .or_else(|| DURATION_OPTIONS.iter().position(|o| o.minutes == 60))
        .unwrap_or_default() as i32
}

fn generated_info(view: &GeneratedView) -> String {
    let expires = view
        .expires_at
        .map(local_time)
        .unwrap_or_else(|| "no expiry".to_string());
    format!(
        "{} ({}) • {} • expires {}",
        view.name,
        view.code,
        duration_label(view.duration_minutes),
        expires
    )
}
