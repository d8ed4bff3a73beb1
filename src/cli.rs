//! Command-line front end: argument parsing, input coercion and printing.
//!
//! There is no "currently selected project" here; commands that act on a
//! project take its ID explicitly.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::AppConfig;
use crate::db::normalize_decimal;
use crate::models::*;
use crate::service::ProjectService;

#[derive(Debug, Parser)]
#[command(name = "projects")]
#[command(about = "Track DIY projects with their materials, steps and categories")]
pub struct Cli {
    /// SQLite database file. Overrides PROJECTS_DB and the config file.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    #[command(flatten)]
    Project(Commands),
    /// Show or change the saved configuration
    Config {
        /// Database file to use when --database and PROJECTS_DB are unset
        #[arg(long)]
        database_path: Option<PathBuf>,

        /// Log filter used when RUST_LOG is unset, e.g. "project_ledger=debug"
        #[arg(long)]
        log_filter: Option<String>,
    },
}

/// Commands that run against the project database.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a project
    Add {
        #[command(flatten)]
        details: DetailsArgs,

        /// Material as NAME[:QUANTITY[:COST]]; repeat for more
        #[arg(long = "material", value_parser = parse_material)]
        materials: Vec<CreateMaterialInput>,

        /// Step text; steps are numbered in the order given
        #[arg(long = "step")]
        steps: Vec<String>,

        /// Category name; created if it does not exist
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// List projects
    List,
    /// Show a project with its materials, steps and categories
    Show { id: ProjectId },
    /// Replace a project's details
    Update {
        id: ProjectId,

        #[command(flatten)]
        details: DetailsArgs,

        /// Replace the project's categories; repeat for more
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Unlink every category from the project
        #[arg(long, conflicts_with = "categories")]
        no_categories: bool,
    },
    /// Delete a project and everything it owns
    Delete { id: ProjectId },
}

#[derive(Debug, Args)]
pub struct DetailsArgs {
    #[arg(long, value_parser = parse_name)]
    pub name: String,

    #[arg(long, value_parser = parse_decimal)]
    pub estimated_hours: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub actual_hours: Option<Decimal>,

    /// 1 (easy) to 5 (hard); anything else is dropped
    #[arg(long, allow_negative_numbers = true)]
    pub difficulty: Option<i32>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl DetailsArgs {
    fn into_update(self) -> UpdateProjectInput {
        UpdateProjectInput {
            name: self.name,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            difficulty: coerce_difficulty(self.difficulty),
            notes: blank_to_none(self.notes),
            categories: None,
        }
    }
}

impl Commands {
    /// Category links for `update`: untouched unless `--category` or
    /// `--no-categories` was given.
    fn replacement_categories(categories: Vec<String>, no_categories: bool) -> Option<Vec<String>> {
        if no_categories || !categories.is_empty() {
            Some(categories)
        } else {
            None
        }
    }

    /// Build the service input for `add`. Steps get orders 1, 2, 3...
    fn create_input(
        details: DetailsArgs,
        materials: Vec<CreateMaterialInput>,
        steps: Vec<String>,
        categories: Vec<String>,
    ) -> CreateProjectInput {
        let details = details.into_update();
        CreateProjectInput {
            name: details.name,
            estimated_hours: details.estimated_hours,
            actual_hours: details.actual_hours,
            difficulty: details.difficulty,
            notes: details.notes,
            materials,
            steps: steps
                .into_iter()
                .zip(1..)
                .map(|(step_text, step_order)| CreateStepInput {
                    step_order,
                    step_text,
                })
                .collect(),
            categories,
        }
    }
}

/// Run one command against the service and return what should be printed.
pub fn execute(command: Commands, service: &ProjectService, json: bool) -> Result<String> {
    match command {
        Commands::Add {
            details,
            materials,
            steps,
            categories,
        } => {
            let input = Commands::create_input(details, materials, steps, categories);
            let project = service.add_project(input)?;
            render(&project, json, "Project created successfully:")
        }
        Commands::List => {
            let projects = service.fetch_all_projects()?;
            if json {
                return Ok(serde_json::to_string_pretty(&projects)?);
            }
            let mut output = String::from("Projects:");
            for project in &projects {
                output.push_str(&format!("\n   {}", project));
            }
            Ok(output)
        }
        Commands::Show { id } => {
            let project = service.fetch_project_by_id(id)?;
            render(&project, json, "Project:")
        }
        Commands::Update {
            id,
            details,
            categories,
            no_categories,
        } => {
            let mut input = details.into_update();
            input.categories = Commands::replacement_categories(categories, no_categories);
            let project = service.modify_project_details(id, input)?;
            render(&project, json, "Project updated:")
        }
        Commands::Delete { id } => {
            service.delete_project(id)?;
            if json {
                return Ok(serde_json::json!({ "deleted": id }).to_string());
            }
            Ok(format!("Project {} was deleted.", id))
        }
    }
}

/// Apply the `config` subcommand's flags. Returns true when anything changed.
pub fn apply_config_flags(
    config: &mut AppConfig,
    database_path: Option<PathBuf>,
    log_filter: Option<String>,
) -> bool {
    let mut changed = false;
    if let Some(path) = database_path {
        config.database_path = Some(path);
        changed = true;
    }
    if let Some(filter) = log_filter {
        config.log_filter = Some(filter);
        changed = true;
    }
    changed
}

fn render<T: Serialize + std::fmt::Display>(value: &T, json: bool, heading: &str) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(format!("{}\n{}", heading, value))
    }
}

fn parse_name(s: &str) -> Result<String, String> {
    let name = s.trim();
    if name.is_empty() {
        return Err("project name must not be blank".to_string());
    }
    Ok(name.to_string())
}

/// Parse a decimal and pin it to two digits of scale. Values that would need
/// rounding to fit are rejected.
pub fn parse_decimal(s: &str) -> Result<Decimal, String> {
    let input = s.trim();
    let value = Decimal::from_str(input)
        .ok()
        .filter(|v| v.round_dp(2) == *v)
        .ok_or_else(|| format!("{} is not a valid decimal number.", input))?;
    Ok(normalize_decimal(value))
}

/// Parse `NAME[:QUANTITY[:COST]]`. Empty quantity or cost means none.
pub fn parse_material(s: &str) -> Result<CreateMaterialInput, String> {
    let mut parts = s.splitn(3, ':').map(str::trim);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err("material name must not be blank".to_string());
    }

    let num_required = match parts.next().filter(|p| !p.is_empty()) {
        Some(raw) => Some(
            raw.parse::<i32>()
                .map_err(|_| format!("{} is not a valid number.", raw))?,
        ),
        None => None,
    };
    let cost = parts
        .next()
        .filter(|p| !p.is_empty())
        .map(parse_decimal)
        .transpose()?;

    Ok(CreateMaterialInput {
        name: name.to_string(),
        num_required,
        cost,
    })
}

/// Difficulty outside 1..=5 is dropped rather than rejected.
pub fn coerce_difficulty(difficulty: Option<i32>) -> Option<i32> {
    match difficulty {
        Some(d) if (1..=5).contains(&d) => Some(d),
        Some(d) => {
            tracing::warn!("Invalid difficulty {}. Difficulty set to null.", d);
            None
        }
        None => None,
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_parse_decimal_sets_scale() {
        assert_eq!(parse_decimal("12.5").unwrap().to_string(), "12.50");
        assert_eq!(parse_decimal(" 3 ").unwrap().to_string(), "3.00");
        assert!(parse_decimal("twelve").is_err());
    }

    #[test]
    fn test_parse_decimal_rejects_extra_scale() {
        assert_eq!(
            parse_decimal("12.345").unwrap_err(),
            "12.345 is not a valid decimal number."
        );
        assert_eq!(parse_decimal("12.340").unwrap().to_string(), "12.34");
        assert!(parse_material("stain::9.999").is_err());
    }

    #[test]
    fn test_parse_material_forms() {
        let full = parse_material("lumber:20:45").unwrap();
        assert_eq!(full.name, "lumber");
        assert_eq!(full.num_required, Some(20));
        assert_eq!(full.cost.unwrap().to_string(), "45.00");

        let bare = parse_material("glue").unwrap();
        assert!(bare.num_required.is_none());
        assert!(bare.cost.is_none());

        let no_qty = parse_material("stain::9.99").unwrap();
        assert!(no_qty.num_required.is_none());
        assert_eq!(no_qty.cost, Some(Decimal::new(999, 2)));

        assert!(parse_material(":3").is_err());
        assert!(parse_material("nails:lots").is_err());
    }

    #[test]
    fn test_coerce_difficulty() {
        assert_eq!(coerce_difficulty(Some(3)), Some(3));
        assert_eq!(coerce_difficulty(Some(0)), None);
        assert_eq!(coerce_difficulty(Some(6)), None);
        assert_eq!(coerce_difficulty(None), None);
    }

    #[test]
    fn test_add_numbers_steps_in_argument_order() {
        let cli = Cli::try_parse_from([
            "projects", "add", "--name", "Deck", "--difficulty", "9", "--notes", "  ",
            "--step", "measure", "--step", "cut", "--category", "outdoor",
        ])
        .unwrap();

        let CliCommand::Project(Commands::Add {
            details,
            materials,
            steps,
            categories,
        }) = cli.command
        else {
            panic!("expected add");
        };
        let input = Commands::create_input(details, materials, steps, categories);

        assert!(input.difficulty.is_none());
        assert!(input.notes.is_none());
        assert_eq!(input.steps[0].step_order, 1);
        assert_eq!(input.steps[1].step_text, "cut");
        assert_eq!(input.steps[1].step_order, 2);
        assert_eq!(input.categories, vec!["outdoor"]);
    }

    #[test]
    fn test_apply_config_flags() {
        let mut config = AppConfig::default();
        assert!(!apply_config_flags(&mut config, None, None));

        assert!(apply_config_flags(
            &mut config,
            None,
            Some("project_ledger=debug".to_string())
        ));
        assert!(config.database_path.is_none());
        assert_eq!(config.log_filter.as_deref(), Some("project_ledger=debug"));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(Cli::try_parse_from(["projects", "add", "--name", "  "]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["projects", "show", "3", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, CliCommand::Project(Commands::Show { id: 3 })));
    }

    #[test]
    fn test_config_is_not_a_project_command() {
        let cli = Cli::try_parse_from(["projects", "config", "--log-filter", "debug"]).unwrap();
        assert!(matches!(
            cli.command,
            CliCommand::Config { database_path: None, log_filter: Some(_) }
        ));
    }

    fn project_command(args: &[&str]) -> Commands {
        let cli = Cli::try_parse_from(std::iter::once("projects").chain(args.iter().copied())).unwrap();
        match cli.command {
            CliCommand::Project(command) => command,
            other => panic!("expected a project command, got {:?}", other),
        }
    }

    #[test]
    fn test_update_category_flags() {
        let keep = project_command(&["update", "1", "--name", "Deck"]);
        let Commands::Update { categories, no_categories, .. } = keep else {
            panic!("expected update");
        };
        assert_eq!(Commands::replacement_categories(categories, no_categories), None);

        let clear = project_command(&["update", "1", "--name", "Deck", "--no-categories"]);
        let Commands::Update { categories, no_categories, .. } = clear else {
            panic!("expected update");
        };
        assert_eq!(Commands::replacement_categories(categories, no_categories), Some(vec![]));

        let conflict = Cli::try_parse_from([
            "projects", "update", "1", "--name", "Deck", "--category", "a", "--no-categories",
        ]);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_execute_add_list_show_against_database() {
        let db = Database::open_memory().unwrap();
        db.initialize().unwrap();
        let service = ProjectService::new(db);

        let added = execute(
            project_command(&[
                "add", "--name", "Deck", "--estimated-hours", "12.5", "--material", "lumber:20:45",
                "--step", "measure", "--category", "outdoor",
            ]),
            &service,
            false,
        )
        .unwrap();
        assert!(added.starts_with("Project created successfully:"));

        let listed = execute(project_command(&["list"]), &service, false).unwrap();
        assert_eq!(listed, "Projects:\n   1: Deck");

        let shown = execute(project_command(&["show", "1"]), &service, false).unwrap();
        assert!(shown.starts_with("Project:\n"));
        assert!(shown.contains("Name=Deck"));
        assert!(shown.contains("EstimatedHours=12.50"));
        assert!(shown.contains("name=lumber, numRequired=20, cost=45.00"));
        assert!(shown.contains("1. measure"));
        assert!(shown.contains("name=outdoor"));

        let updated = execute(
            project_command(&["update", "1", "--name", "Deck", "--category", "garden"]),
            &service,
            false,
        )
        .unwrap();
        assert!(updated.contains("name=garden"));
        assert!(!updated.contains("name=outdoor"));

        let missing = execute(project_command(&["show", "2"]), &service, false);
        assert!(missing.is_err());
    }
}
