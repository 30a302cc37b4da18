use clap::{Parser, Subcommand};
use log::{debug, error, info, LevelFilter};
use newsletter_client::views::search::{SEARCH_FAILED, SUMMARIZE_FAILED};
use newsletter_client::views::{LoginView, SearchView, SetupStep, SetupView};
use newsletter_client::{
    setup_logging, BackendClient, BrowserNavigator, Config, EmailId, GateState, Navigator,
};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[clap(name = "Newsletter Client")]
#[clap(version)]
#[clap(about = "Search and summarize your newsletters", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Write logs to this file instead of stderr
    #[clap(long, global = true)]
    log_file: Option<String>,

    /// Enable debug logging
    #[clap(long, short, global = true, action)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the current session is signed in
    Status,

    /// Sign in with Gmail in the browser
    Login {
        /// Print the sign-in URL instead of opening the browser
        #[clap(long, action)]
        print_url: bool,
    },

    /// End the current session
    Logout,

    /// Choose the Gmail folder that holds newsletters
    Setup {
        /// Name of the Gmail label/folder
        #[clap(long)]
        folder: String,

        /// The folder does not exist yet (prints how to create it)
        #[clap(long, action)]
        new: bool,
    },

    /// Search newsletters by sender or subject
    Search { query: String },

    /// Summarize one email by id
    Summarize { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    match cli.log_file.as_deref() {
        Some(path) => {
            if let Err(e) = setup_logging(level, Some(path)) {
                eprintln!("Failed to set up logging: {}", e);
                process::exit(1);
            }
        }
        None => env_logger::builder().filter_level(level).init(),
    }

    if let Err(msg) = run(cli.command).await {
        eprintln!("{}", msg);
        process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;
    info!("Using backend {}", config.backend_url);

    let client = BackendClient::new(&config).map_err(|e| e.to_string())?;
    let navigator = Arc::new(BrowserNavigator::new());
    let nav: Arc<dyn Navigator> = navigator.clone();

    match command {
        Commands::Status => {
            let mut view = LoginView::new(client, nav);
            match view.mount().await {
                GateState::Authenticated => println!("Signed in"),
                GateState::Unauthenticated => println!("Not signed in"),
                GateState::Error(msg) => return Err(msg),
                GateState::Checking => return Err("Authentication status unknown".to_string()),
            }
        }
        Commands::Login { print_url } => {
            let mut view = LoginView::new(client.clone(), nav);
            if view.mount().await == GateState::Authenticated {
                println!("Already signed in");
                return Ok(());
            }
            if let Some(msg) = view.status_text() {
                eprintln!("{}", msg);
            }

            if print_url {
                let url = client
                    .auth_url()
                    .await
                    .map_err(|e| e.user_message("Failed to get sign-in URL"))?;
                println!("{}", url);
            } else {
                view.sign_in().map_err(|e| e.to_string())?;
                println!("Continue signing in with Gmail in your browser.");
            }
        }
        Commands::Logout => {
            let mut view = SearchView::new(client, nav);
            require_signed_in(view.mount().await)?;
            view.logout()
                .await
                .map_err(|e| e.user_message("Failed to logout"))?;
            println!("Logged out");
        }
        Commands::Setup { folder, new } => {
            let mut view = SetupView::new(client, nav);
            require_signed_in(view.mount().await)?;
            if view.step() == SetupStep::Done {
                println!("A folder is already configured");
                return Ok(());
            }

            view.answer_has_folder(!new);
            println!("{}", view.heading());
            if let Some(steps) = view.instructions() {
                for (i, step) in steps.iter().enumerate() {
                    println!("  {}. {}", i + 1, step);
                }
            }

            view.set_folder_name(folder);
            if view.submit().await.is_err() {
                return Err(view
                    .submit_state()
                    .error()
                    .unwrap_or("Failed to save settings")
                    .to_string());
            }
            println!("Saved folder '{}'", view.folder_name().trim());
        }
        Commands::Search { query } => {
            let mut view = SearchView::new(client, nav);
            require_signed_in(view.mount().await)?;

            if let Err(e) = view.search(&query).await {
                return Err(e.user_message(SEARCH_FAILED));
            }
            let state = view.visible_state().ok_or("Not signed in")?;
            if state.no_matches() {
                println!("No matches");
            }
            for email in state.results().unwrap_or_default() {
                println!("[{}] {} - {}", email.id, email.sender, email.subject);
                if let Some(preview) = &email.preview {
                    println!("    {}", preview);
                }
            }
        }
        Commands::Summarize { id } => {
            let mut view = SearchView::new(client, nav);
            require_signed_in(view.mount().await)?;

            view.open(EmailId::new(id))
                .await
                .map_err(|e| e.user_message(SUMMARIZE_FAILED))?;
            let state = view.visible_state().ok_or("Not signed in")?;
            match state.displayed_summary() {
                Some(summary) => println!("{}", summary.text),
                None => return Err("No summary available".to_string()),
            }
        }
    }

    debug!("Last route: {:?}", navigator.last_route());
    Ok(())
}

fn require_signed_in(state: GateState) -> Result<(), String> {
    match state {
        GateState::Authenticated => Ok(()),
        GateState::Error(msg) => {
            error!("Auth check failed: {}", msg);
            Err(format!("{}. Run `login` to sign in.", msg))
        }
        _ => Err("Not signed in. Run `login` to sign in.".to_string()),
    }
}
