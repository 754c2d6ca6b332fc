//! CLI commands

use anyhow::{Result, anyhow};
use clap::Subcommand;
use pb_admin::ApiClient;
use pb_admin_core::AuthStore;
use pb_admin_http::ClientError;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in as a superuser and persist the session
    Login {
        /// Superuser email
        #[arg(long)]
        email: String,

        /// Superuser password
        #[arg(long, env = "PB_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Refresh the persisted session against the backend
    Restore,

    /// Print the signed-in superuser
    Whoami,

    /// Print a token for downloading protected files
    FileToken {
        /// Collection the file belongs to
        #[arg(long)]
        collection: Option<String>,
    },

    /// Print the download URL of a record file
    FileUrl {
        #[arg(long)]
        collection: String,

        #[arg(long)]
        record: String,

        #[arg(long)]
        file: String,
    },

    /// Forget the persisted session
    Logout,
}

impl Commands {
    pub async fn execute(self, api: &ApiClient) -> Result<()> {
        match self {
            Commands::Login { email, password } => {
                let record = api
                    .login(email, password)
                    .await
                    .map_err(|e| report(api, &e, "Failed to sign in."))?;
                println!("Signed in as {}", record.email().unwrap_or(&record.id));
            }
            Commands::Restore => {
                let state = api.restore_session().await;
                println!("{state:?}");
            }
            Commands::Whoami => match api.stores().superuser.get() {
                Some(record) if api.auth_store().is_valid() => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                _ => return Err(anyhow!("Not signed in")),
            },
            Commands::FileToken { collection } => {
                let token = api
                    .get_superuser_file_token(collection.as_deref())
                    .await
                    .map_err(|e| report(api, &e, "Failed to get a file token."))?;
                if token.is_empty() {
                    info!("Collection files are not protected, no token needed");
                }
                println!("{token}");
            }
            Commands::FileUrl {
                collection,
                record,
                file,
            } => {
                let url = api
                    .file_url(&collection, &record, &file)
                    .await
                    .map_err(|e| report(api, &e, "Failed to build the file URL."))?;
                println!("{url}");
            }
            Commands::Logout => {
                api.logout(false);
                println!("Signed out");
            }
        }
        Ok(())
    }
}

/// Route a failed request through the client's error handling and turn the
/// resulting notification into the command's error
fn report(api: &ApiClient, err: &ClientError, default_msg: &str) -> anyhow::Error {
    api.error(err, true, default_msg);

    let message = api
        .stores()
        .toasts
        .snapshot()
        .pop()
        .map(|toast| toast.message)
        .unwrap_or_else(|| err.to_string());

    let field_errors = api.stores().form_errors.snapshot();
    if field_errors.is_empty() {
        anyhow!(message)
    } else {
        let fields = field_errors.keys().cloned().collect::<Vec<_>>().join(", ");
        anyhow!("{message} (invalid fields: {fields})")
    }
}
