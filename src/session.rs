use std::path::PathBuf;

use cohort_api::client::ApiClient;
use cohort_lib::cohort::{self, NAME_FIELD, CSV_FIELD};
use cohort_lib::{FileRef, FormBinding, Submission, Trigger, TriggerOutcome};

use crate::commands;
use crate::config::Settings;
use crate::error;
use crate::input;

fn print_outcome(outcome: &TriggerOutcome) {
    match outcome {
        TriggerOutcome::Ignored => {},
        TriggerOutcome::Field(Ok(())) => println!("ok"),
        TriggerOutcome::Field(Err(err)) => println!("{}", err),
        TriggerOutcome::Submitted(Submission::Proceed) => println!("submitted"),
        TriggerOutcome::Submitted(Submission::Blocked(result)) => commands::print_errors(result),
    }
}

/// runs an interactive session over a single upload form. the session ends
/// once the form is submitted or stdin is closed.
pub async fn run(client: &ApiClient, settings: &Settings) -> error::Result {
    let mut form = cohort::upload_form("", None);
    let mut binding = FormBinding::bind(
        &form,
        settings.form.clone(),
        cohort::methods(),
        client
    )?;

    loop {
        let Some(given) = input::read_line("> ")? else {
            return Ok(());
        };

        let Ok(args_list) = shell_words::split(given.trim()) else {
            println!("failed to parse command line args");
            continue;
        };

        if args_list.is_empty() {
            continue;
        }

        let matches = match commands::interactive().try_get_matches_from(args_list) {
            Ok(m) => m,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match matches.subcommand() {
            Some(("quit", _)) => {
                return Ok(());
            },
            Some(("name", name_matches)) => {
                let value = name_matches.get_one::<String>("value")
                    .cloned()
                    .unwrap_or_default();

                form.set_text(NAME_FIELD, value);
            },
            Some(("key", key_matches)) => {
                if let Some(field) = key_matches.get_one::<String>("field") {
                    let outcome = binding.trigger(&form, Trigger::KeyUp(field.clone())).await;

                    print_outcome(&outcome);
                }
            },
            Some(("csv", csv_matches)) => {
                if let Some(path) = csv_matches.get_one::<PathBuf>("path") {
                    match FileRef::from_path(path) {
                        Ok(file) => {
                            form.attach(CSV_FIELD, file);
                        },
                        Err(err) => {
                            println!("failed to attach \"{}\": {}", path.display(), err);
                        }
                    }
                }
            },
            Some(("detach", _)) => {
                form.detach(CSV_FIELD);
            },
            Some(("blur", blur_matches)) => {
                if let Some(field) = blur_matches.get_one::<String>("field") {
                    let outcome = binding.trigger(&form, Trigger::Blur(field.clone())).await;

                    print_outcome(&outcome);
                }
            },
            Some(("state", _)) => {
                for (name, state) in binding.states() {
                    println!("{name}: {state}");
                }
            },
            Some(("submit", _)) => {
                let outcome = binding.trigger(&form, Trigger::Submit).await;

                print_outcome(&outcome);

                if matches!(outcome, TriggerOutcome::Submitted(Submission::Proceed)) {
                    return Ok(());
                }
            },
            _ => {
                println!("unknown command");
            }
        }
    }
}
