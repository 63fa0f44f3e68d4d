use std::io::{self, BufRead, Write};
use std::sync::Arc;

use profile_manager::{ConsoleInterface, MemoryDocumentStore, MemoryKeyValueStore, UiEvent, UserManager};
use shared::{PersonalId, ProfileConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    shared::init_tracing("profile-manager")?;

    if let Ok(port) = std::env::var("METRICS_PORT") {
        let port: u16 = port.parse().expect("METRICS_PORT must be a valid port number");
        shared::init_metrics(port)?;
    }

    let identity = std::env::var("PROFILE_UID").unwrap_or_else(|_| "local-device".to_string());
    let config = ProfileConfig::from_env()?;

    tracing::info!(
        identity = %identity,
        max_users = config.max_users,
        "Configuration loaded"
    );

    let store = Arc::new(MemoryDocumentStore::new());
    let kv = Arc::new(MemoryKeyValueStore::new());
    let ui = Box::new(ConsoleInterface::new());
    let mut manager = UserManager::new(store, kv, Some(ui), config);

    manager.on_user_changed(|current| match current {
        Some(user) => tracing::info!(
            personal_id = %user.personal_id,
            user_name = %user.user_name,
            "Active user changed"
        ),
        None => tracing::info!("Active user cleared"),
    });

    let user_name = manager.init(&identity).await?;
    tracing::info!(user_name = %user_name, "Profile manager ready");

    println!("コマンド: list | add | rename | delete | select <id> | quit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let mut parts = line.trim().split_whitespace();
        match parts.next() {
            Some("list") => {
                for user in manager.list_users().await? {
                    println!("{}  [{}]", user.user_name, user.personal_id);
                }
            }
            Some("add") => manager.handle_event(UiEvent::AddRequested).await,
            Some("rename") => manager.handle_event(UiEvent::RenameRequested).await,
            Some("delete") => manager.handle_event(UiEvent::DeleteRequested).await,
            Some("select") => match parts.next().map(PersonalId::new) {
                Some(Ok(personal_id)) => {
                    manager
                        .handle_event(UiEvent::SelectionChanged(personal_id))
                        .await
                }
                _ => println!("使い方: select <personal-id>"),
            },
            Some("quit") | Some("exit") => break,
            Some(other) => println!("不明なコマンド: {}", other),
            None => {}
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}
