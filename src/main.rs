use std::sync::Arc;

use sessiongate::config::AppConfig;
use sessiongate::error::{AuthError, ErrorCode};
use sessiongate::gate::RouteLocation;
use sessiongate::prefs::{FileStorage, PreferenceStore, Theme, ThemeController};
use sessiongate::session::SessionStore;
use sessiongate::session::memory::MemoryIdentityProvider;
use sessiongate::session::provider::SignUpOutcome;
use sessiongate::shell::{AppShell, ChannelNavigator};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const HELP: &str = "commands: register <email> <password> | signin <email> <password> | signup <email> <password> \
                    | oauth <provider> <email> | signout | go <path> | theme [light|dark|toggle] | status | quit";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let config = AppConfig::from_env();

    let storage = Arc::new(FileStorage::new(config.prefs_dir.clone()));
    let (prefs, _writer) = PreferenceStore::start(storage, config.prefs_namespace.clone(), config.pref_write);
    if let Err(e) = prefs.load_all().await {
        tracing::warn!(error = %e, "preference hydration failed; using defaults");
    }
    let theme = ThemeController::new(prefs.clone(), config.system_theme);

    let provider = Arc::new(MemoryIdentityProvider::new());
    let (session, _consumer) = SessionStore::start(provider.clone());

    let (route_tx, route_rx) = mpsc::unbounded_channel();
    let shell = AppShell::new(ChannelNavigator::new(route_tx.clone()), &session, prefs.clone(), RouteLocation::default());
    let states = shell.watch();
    let shell_task = tokio::spawn(shell.run(config.splash_delay, route_rx));

    tracing::info!(theme = theme.current().as_str(), prefs_dir = %config.prefs_dir.display(), "sessiongate ready");
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => break,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit" | "exit"] => break,
            ["register", email, password] => {
                let id = provider.register(email, password);
                println!("registered {email} ({id})");
            }
            ["signin", email, password] => report(session.sign_in(email, password).await.map(|()| "signed in")),
            ["signup", email, password] => report(session.sign_up(email, password).await.map(|outcome| match outcome {
                SignUpOutcome::SessionGranted => "signed up",
                SignUpOutcome::ConfirmationRequired => "check your inbox",
            })),
            ["oauth", provider_id, email] => {
                let started = session.sign_in_with_provider(provider_id).await;
                let completed = started.and_then(|()| provider.complete_oauth(provider_id, email));
                report(completed.map(|()| "signed in"));
            }
            ["signout"] => report(session.sign_out().await.map(|()| "signed out")),
            ["go", path] => {
                if route_tx.send(RouteLocation::from_path(path)).is_err() {
                    tracing::warn!(%path, "shell stopped; route change dropped");
                }
            }
            ["theme"] => println!("theme: {}", theme.current().as_str()),
            ["theme", "toggle"] => println!("theme: {}", theme.toggle().as_str()),
            ["theme", name] => match Theme::parse(name) {
                Some(choice) => {
                    theme.set(choice);
                    println!("theme: {}", choice.as_str());
                }
                None => println!("unknown theme {name:?}"),
            },
            ["status"] => {
                let user = session.current_session();
                let email = user.identity().map_or("-", |identity| identity.email.as_str());
                println!("session: {:?} ({email}) gate: {:?}", session.status(), *states.borrow());
            }
            _ => println!("{HELP}"),
        }
    }

    tracing::info!("shutting down");
    prefs.flush().await;
    shell_task.abort();
}

fn report(result: Result<&str, AuthError>) {
    match result {
        Ok(message) => println!("{message}"),
        Err(e) => println!("error [{}]: {e}", e.error_code()),
    }
}
