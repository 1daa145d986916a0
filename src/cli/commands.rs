use clap::{Parser, Subcommand};

/// Nexa - AI home construction assistant.
#[derive(Parser, Debug)]
#[command(name = "nexa")]
#[command(version = "0.1.0")]
#[command(about = "AI assistant for home construction, materials, and design.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway server
    Gateway {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Send one chat turn (creates a chat when none is given)
    Chat {
        /// Owner id the chat belongs to
        #[arg(short, long)]
        owner: String,

        /// Message to send
        #[arg(short, long)]
        message: Option<String>,

        /// Image to attach: a file path or a data URI
        #[arg(short, long)]
        image: Option<String>,

        /// Existing chat id (defaults to a new chat)
        #[arg(short, long)]
        chat: Option<String>,
    },

    /// Manage chats
    Chats {
        #[command(subcommand)]
        chats_command: ChatsCommands,
    },

    /// Recommend construction materials for a category
    Materials {
        /// Category, e.g. "Foundation & Structure" or "Waterproofing"
        #[arg(short, long)]
        category: String,
    },

    /// Generate color palettes for a design scheme
    Palette {
        /// Design scheme, e.g. "modern", "minimalist", "Scandinavian"
        #[arg(short, long)]
        design_scheme: String,

        /// Colors per palette (3-8)
        #[arg(short, long, default_value = "5")]
        colors: u8,
    },

    /// Design, elevation, and color suggestions from a photo
    Suggest {
        /// Image to analyze: a file path or a data URI
        #[arg(short, long)]
        image: String,
    },

    /// Elevation ideas and planning suggestions from preferences
    Plan {
        /// Free-form preferences, e.g. "3BHK, vastu-compliant, sloped roof"
        #[arg(short, long)]
        preferences: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChatsCommands {
    /// List chats for an owner, newest first
    List {
        /// Owner id
        #[arg(short, long)]
        owner: String,
    },

    /// Create a chat
    New {
        /// Owner id
        #[arg(short, long)]
        owner: String,

        /// First message text used to derive the title
        #[arg(short, long, default_value = "")]
        seed: String,
    },
}
