use std::path::PathBuf;

use clap::{Command, Arg, ArgAction, ArgMatches, value_parser};
use cohort_api::client::ApiClient;
use cohort_api::cohorts::ValidateName;
use cohort_lib::{cohort, FileRef, FormBinding, Submission, ValidationResult};
use cohort_lib::rules::DEFAULT_REQUIRED_MESSAGE;
use cohort_lib::validation::is_blank;
use cohort_lib::RemoteVerdict;

use crate::config::Settings;
use crate::error::{self, Context};

pub fn cli() -> Command {
    Command::new("cohort-upload")
        .about("validates cohort uploads against the cohort rules and a remote server")
        .arg(Arg::new("config")
            .long("config")
            .action(ArgAction::Append)
            .value_parser(value_parser!(PathBuf))
            .help("a json or yaml config file to load. may be given multiple times")
        )
        .arg(Arg::new("host")
            .long("host")
            .help("the desired hostname to validate against")
        )
        .arg(Arg::new("port")
            .long("port")
            .short('p')
            .value_parser(value_parser!(u16))
            .help("the desired port to connect to")
        )
        .arg(Arg::new("secure")
            .long("secure")
            .short('s')
            .action(ArgAction::SetTrue)
            .help("sets the connection to use https")
        )
        .arg(Arg::new("cookies")
            .long("cookies")
            .value_parser(value_parser!(PathBuf))
            .help("a cookie file holding an authenticated session")
        )
        .subcommand(Command::new("check-name")
            .about("checks if a cohort name is valid and available")
            .arg(Arg::new("name")
                .required(true)
                .help("the cohort name to check")
            )
            .arg(Arg::new("local")
                .long("local")
                .action(ArgAction::SetTrue)
                .help("skip the availability check against the server")
            )
        )
        .subcommand(Command::new("validate")
            .about("validates a cohort upload as if the form was submitted")
            .arg(Arg::new("name")
                .short('n')
                .long("name")
                .default_value("")
                .help("name of the cohort")
            )
            .arg(Arg::new("csv")
                .long("csv")
                .value_parser(value_parser!(PathBuf))
                .help("csv file to attach to the upload")
            )
        )
}

pub fn interactive() -> Command {
    Command::new("")
        .subcommand_required(true)
        .no_binary_name(true)
        .subcommand(Command::new("name")
            .about("sets the cohort name field")
            .arg(Arg::new("value")
                .default_value("")
                .help("the new value of the field")
            )
        )
        .subcommand(Command::new("key")
            .about("sends a key up event to a field")
            .arg(Arg::new("field")
                .required(true)
            )
        )
        .subcommand(Command::new("csv")
            .about("attaches a csv file")
            .arg(Arg::new("path")
                .required(true)
                .value_parser(value_parser!(PathBuf))
            )
        )
        .subcommand(Command::new("detach")
            .about("removes the attached csv file")
        )
        .subcommand(Command::new("blur")
            .about("moves focus out of a field")
            .arg(Arg::new("field")
                .required(true)
            )
        )
        .subcommand(Command::new("state")
            .about("shows the validation state of each field")
        )
        .subcommand(Command::new("submit")
            .about("submits the form")
        )
        .subcommand(Command::new("quit")
            .alias("q")
            .about("exits program")
        )
}

pub fn print_errors(result: &ValidationResult) {
    for err in result.errors() {
        println!("{}", err);
    }
}

/// applies the required and cohortName rules of the upload form to a name
fn check_name_locally(name: &str) -> Result<(), &'static str> {
    if is_blank(name) {
        Err(DEFAULT_REQUIRED_MESSAGE)
    } else if !cohort::name_valid(name) {
        Err(cohort::NAME_METHOD_MESSAGE)
    } else {
        Ok(())
    }
}

/// checks the name locally and, unless `--local` is given, asks the server
/// if it is available
pub async fn check_name(client: &ApiClient, args: &ArgMatches) -> error::Result {
    let name = args.get_one::<String>("name")
        .context("missing cohort name")?;

    check_name_locally(name).map_err(error::Error::invalid)?;

    if args.get_flag("local") {
        println!("\"{}\" is a valid cohort name", name);

        return Ok(());
    }

    match ValidateName::name(name.clone()).send(client).await? {
        RemoteVerdict::Available => {
            println!("\"{}\" is available", name);

            Ok(())
        },
        RemoteVerdict::Taken(msg) => Err(error::Error::invalid(
            msg.unwrap_or_else(|| cohort::NAME_TAKEN_MESSAGE.to_owned())
        ))
    }
}

pub async fn validate(client: &ApiClient, settings: &Settings, args: &ArgMatches) -> error::Result {
    let name = args.get_one::<String>("name")
        .cloned()
        .unwrap_or_default();
    let csv = match args.get_one::<PathBuf>("csv") {
        Some(path) => Some(FileRef::from_path(path).context(format!(
            "failed to attach csv file: \"{}\"", path.display()
        ))?),
        None => None
    };

    let form = cohort::upload_form(name.clone(), csv);
    let mut binding = FormBinding::bind(
        &form,
        settings.form.clone(),
        cohort::methods(),
        client
    )?;

    match binding.submit(&form).await {
        Submission::Proceed => {
            println!("cohort \"{}\" may be submitted", name);

            Ok(())
        },
        Submission::Blocked(result) => {
            print_errors(&result);

            Err(error::Error::invalid("submission blocked"))
        }
    }
}
