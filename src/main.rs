//! dexa's main application entry point.
//! Parses the command line, builds the stack registry and dispatches to the
//! init/add/generate/stack commands.

use std::path::{Path, PathBuf};

use dexa::{
    cli::{get_args, Args, Commands, RenderArgs, StackCommands},
    command::CommandKind,
    config::Config,
    error::{default_error_handler, Result},
    loader::GitFetcher,
    logger::init_logger,
    project::Project,
    prompt::{DialoguerPrompter, Prompter},
    registry::StackRegistry,
    stack::Stack,
};
use serde_json::Value;

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build();
    let result = match runtime {
        Ok(runtime) => runtime.block_on(run(args)),
        Err(e) => Err(e.into()),
    };
    if let Err(err) = result {
        default_error_handler(err);
    }
}

async fn run(args: Args) -> Result<()> {
    let prompt = DialoguerPrompter::new();
    let fetcher = GitFetcher::new();
    let mut registry = StackRegistry::load(Config::from_env())?;

    match args.command {
        Commands::Init { stack, project, path, yes, render } => {
            init(&mut registry, &prompt, stack, project, path, yes, render).await
        }
        Commands::Add { feature, render } => {
            let current_folder = std::env::current_dir()?;
            let mut project = Project::load(&current_folder)?;
            let Some(stack) = registry.ensure_stack_from_project(&project, &prompt, &fetcher)? else {
                return Ok(());
            };
            let Some(feature) = feature else {
                print_commands(stack, CommandKind::Add)?;
                return Ok(());
            };

            let command = stack.command(CommandKind::Add, &feature)?;
            let mut options = render.user_options();
            project.add_feature(command, &mut options).await?;
            println!("🚀 Done adding \"{feature}\" to {}!", project.name);
            Ok(())
        }
        Commands::Generate { generator, name, render } => {
            let current_folder = std::env::current_dir()?;
            let project = Project::load(&current_folder)?;
            let Some(stack) = registry.ensure_stack_from_project(&project, &prompt, &fetcher)? else {
                return Ok(());
            };
            let Some(generator) = generator else {
                print_commands(stack, CommandKind::Generate)?;
                return Ok(());
            };

            let command = stack.command(CommandKind::Generate, &generator)?;
            let mut options = render.user_options();
            if let Some(name) = name {
                options.insert("name".to_string(), Value::String(name));
            }
            project.generate(command, &mut options).await?;
            println!("🚀 Done generating the new \"{generator}\"!");
            Ok(())
        }
        Commands::Stack(StackCommands::List) => {
            println!("Predefined stacks:");
            for stack in registry.stacks().iter().filter(|s| s.is_predefined()) {
                println!("  {}: {}", stack.name(), stack.location_path().display());
            }
            println!();
            println!("User-defined stacks:");
            for stack in registry.stacks().iter().filter(|s| !s.is_predefined()) {
                println!("  {}: {}", stack.name(), stack.origin());
            }
            Ok(())
        }
        Commands::Stack(StackCommands::Add { name, origin, private }) => {
            registry.add_new_stack(&name, &origin, private, &fetcher)?;
            println!("Stack {name} added!");
            Ok(())
        }
        Commands::Stack(StackCommands::Delete { name, yes }) => {
            if !prompt.confirm(yes, format!("Delete stack {name}?"))? {
                return Ok(());
            }
            registry.delete_stack_by_name(&name)?;
            println!("Stack {name} deleted!");
            Ok(())
        }
    }
}

async fn init(
    registry: &mut StackRegistry,
    prompt: &dyn Prompter,
    stack_name: String,
    project_name: Option<String>,
    path: Option<PathBuf>,
    yes: bool,
    render: RenderArgs,
) -> Result<()> {
    let current_folder = std::env::current_dir()?;
    let in_current_folder = project_name.is_none() && path.is_none();
    let base = path.unwrap_or_else(|| current_folder.clone());
    let (name, destination) = match project_name {
        Some(name) => (name.clone(), base.join(name)),
        None => (folder_name(&base), base),
    };

    if in_current_folder {
        if !prompt.confirm(yes, "Generate project in current directory?".to_string())? {
            return Ok(());
        }
    } else if destination.exists()
        && !prompt.confirm(
            yes,
            format!(
                "Target directory exists ({}). Existing files will only be overridden with the \"-o\" option. Continue?",
                destination.display()
            ),
        )?
    {
        return Ok(());
    }

    let stack = registry.stack_mut(&stack_name)?;
    println!(
        "Creating new project in \"{}\" using stack \"{}\" from {}",
        destination.display(),
        stack.name(),
        stack.location_path().display()
    );
    let mut options = render.user_options();
    let (project, _) = Project::init(name, stack, &destination, &mut options).await?;
    println!("🚀 Project {} created!", project.name);
    Ok(())
}

fn print_commands(stack: &mut Stack, kind: CommandKind) -> Result<()> {
    let stack_name = stack.name().to_string();
    let commands = stack.load_commands()?;
    let available = commands.of_kind(kind);
    if available.is_empty() {
        println!("The stack {stack_name} does not define any {kind} command!");
        return Ok(());
    }
    println!("Available {kind} commands:");
    for command in available {
        println!("  {:<20} {}", command.name(), command.description());
    }
    Ok(())
}

fn folder_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "project".to_string())
}
