use crate::Config;
use crate::chat::{ChatAction, ChatController};
use crate::cli::{ChatsCommands, Cli, Commands};
use crate::flows::{
    DesignQuery, FlowInvoker, MaterialQuery, PaletteRequest, PlanningRequest,
};
use crate::llm::{GeminiProvider, Provider};
use crate::store::{ChatStore, SqliteChatStore};
use anyhow::{Context, Result, bail};
use base64::Engine as _;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::Arc;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Gateway { port, host } => {
            crate::gateway::run_gateway(&host, port, config).await
        }

        Commands::Chat {
            owner,
            message,
            image,
            chat,
        } => run_chat(&config, &owner, message, image, chat).await,

        Commands::Chats { chats_command } => match chats_command {
            ChatsCommands::List { owner } => {
                let store = open_store(&config).await?;
                let chats = store.list_chats(&owner).await?;
                if chats.is_empty() {
                    println!("No chats yet for {owner}.");
                }
                for chat in chats {
                    println!("{}  {}  {}", chat.id, chat.created_at, chat.title);
                }
                Ok(())
            }
            ChatsCommands::New { owner, seed } => {
                let store = open_store(&config).await?;
                let chat = store.create_chat(&owner, &seed).await?;
                println!("✓ Created chat {} ({})", chat.id, chat.title);
                Ok(())
            }
        },

        Commands::Materials { category } => {
            let flows = build_flows(&config)?;
            let output = flows
                .recommend_materials(&MaterialQuery { category })
                .await?;
            for material in &output.recommendations {
                println!("◆ {} ({:.1}/5)", material.name, material.rating);
                println!("  {}", material.description);
                println!("  Price: {}  Durability: {}", material.price_range, material.durability);
                println!("  Brands: {}", material.brands.join(", "));
                println!("  Budget-friendly: {}", if material.budget_friendly { "yes" } else { "no" });
                println!("  Pros: {}", material.pros);
                println!("  Cons: {}", material.cons);
                println!("  Warranty: {}", material.warranty);
                println!("  Tips: {}", material.usage_tips);
                for faq in &material.faqs {
                    println!("  Q: {}", faq.question);
                    println!("  A: {}", faq.answer);
                }
                println!();
            }
            Ok(())
        }

        Commands::Palette {
            design_scheme,
            colors,
        } => {
            let flows = build_flows(&config)?;
            let output = flows
                .generate_palette(&PaletteRequest {
                    design_scheme,
                    number_of_colors: colors,
                })
                .await?;
            for palette in &output.palettes {
                println!("◆ {}", palette.palette_name);
                println!("  {}", palette.description);
                for color in &palette.colors {
                    println!(
                        "  {}  {}  {}  ({})",
                        color.hex, color.rgb, color.name, color.suggested_use
                    );
                }
                println!();
            }
            Ok(())
        }

        Commands::Suggest { image } => {
            let flows = build_flows(&config)?;
            let photo_data_uri = data_uri_from_arg(&image)?;
            let output = flows
                .design_suggestions(&DesignQuery { photo_data_uri })
                .await?;
            println!("◆ Design\n{}\n", output.design_suggestions);
            println!("◆ Elevation\n{}\n", output.elevation_suggestions);
            println!("◆ Colors\n{}", output.color_suggestions);
            Ok(())
        }

        Commands::Plan { preferences } => {
            let flows = build_flows(&config)?;
            let output = flows.planning_ideas(&PlanningRequest { preferences }).await?;
            println!("◆ Elevation ideas\n{}\n", output.elevation_ideas);
            println!("◆ Planning suggestions\n{}", output.planning_suggestions);
            Ok(())
        }
    }
}

async fn run_chat(
    config: &Config,
    owner: &str,
    message: Option<String>,
    image: Option<String>,
    chat: Option<String>,
) -> Result<()> {
    let message = message.unwrap_or_default();
    if message.is_empty() && image.is_none() {
        bail!("Provide --message, --image, or both");
    }
    let photo_data_uri = image.as_deref().map(data_uri_from_arg).transpose()?;

    let store = open_store(config).await?;
    let flows = build_flows(config)?;
    let action = Arc::new(ChatAction::new(store.clone(), flows));
    let mut controller =
        ChatController::new(owner, store, action).with_history_limit(config.history_limit);

    match chat {
        Some(chat_id) => controller.select_chat(&chat_id).await?,
        None => {
            controller.new_chat(&message).await?;
            println!(
                "✓ New chat {} ({})",
                controller.active_chat_id().unwrap_or_default(),
                controller.chats().first().map_or("", |c| c.title.as_str())
            );
        }
    }

    let answer = controller.send(&message, photo_data_uri).await?;
    println!("{answer}");
    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn ChatStore>> {
    let options = SqliteConnectOptions::new()
        .filename(&config.database_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to open chat database")?;
    Ok(Arc::new(SqliteChatStore::new(pool).await?))
}

fn build_flows(config: &Config) -> Result<Arc<FlowInvoker>> {
    let api_key = config.resolve_api_key();
    let provider: Arc<dyn Provider> = Arc::new(GeminiProvider::new(api_key.as_deref()));
    Ok(Arc::new(FlowInvoker::new(
        provider,
        config.default_model.clone(),
        config.default_temperature,
    )))
}

/// Accepts either a ready-made data URI or a path to an image file, which is
/// read and base64-encoded with a media type derived from its extension.
fn data_uri_from_arg(arg: &str) -> Result<String> {
    if arg.starts_with("data:") {
        return Ok(arg.to_string());
    }
    let path = Path::new(arg);
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image {arg}"))?;
    let media_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        other => bail!(
            "Unsupported image extension {:?}; expected jpg, jpeg, png, webp, or gif",
            other.unwrap_or("")
        ),
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{media_type};base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::data_uri_from_arg;
    use std::io::Write;

    #[test]
    fn data_uri_passes_through() {
        let uri = "data:image/png;base64,aGVsbG8=";
        assert_eq!(data_uri_from_arg(uri).unwrap(), uri);
    }

    #[test]
    fn file_is_encoded_with_extension_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"hello").unwrap();

        let uri = data_uri_from_arg(path.to_str().unwrap()).unwrap();
        assert_eq!(uri, "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hi").unwrap();
        assert!(data_uri_from_arg(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(data_uri_from_arg("/no/such/file.png").is_err());
    }
}
