use anyhow::Result;
use clap::{Parser, Subcommand};
use folio::areas::repository::Repository;
use folio::artifacts::config::DEFAULT_CONFIG_FILE;
use folio::artifacts::core::init_tracing;
use folio::commands::plumbing::hash_object::hash_object;
use folio::commands::porcelain::save::FieldArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "folio",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Edit structured content stored in a Git repository",
    long_about = "folio reads and writes the entries of the collections described by a CMS \
    configuration file. Every save is committed straight to the configured branch \
    through the hosting service's Git API; no local clone is needed.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        env = "FOLIO_CONFIG",
        default_value = DEFAULT_CONFIG_FILE,
        help = "Path to the CMS configuration file"
    )]
    config: PathBuf,
    #[arg(
        long,
        global = true,
        env = "FOLIO_TOKEN",
        hide_env_values = true,
        help = "Access token for the backend (overrides the stored login)"
    )]
    token: Option<String>,
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug)"
    )]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "collections", about = "List the configured collections")]
    Collections,
    #[command(
        name = "entries",
        about = "List the entries of a collection",
        long_about = "This command prints the slug and title of every entry of the collection, \
        in repository order."
    )]
    Entries {
        #[arg(index = 1, help = "The collection name")]
        collection: String,
    },
    #[command(name = "show", about = "Print an entry")]
    Show {
        #[arg(index = 1, help = "The collection name")]
        collection: String,
        #[arg(index = 2, help = "The entry slug (or file name for file collections)")]
        slug: String,
        #[arg(long, help = "Print the entry as JSON")]
        json: bool,
    },
    #[command(
        name = "new",
        about = "Create an entry",
        long_about = "This command creates an entry in a folder collection. Field values are \
        given as key=value pairs and read as YAML scalars; the slug is rendered from the \
        collection's slug template."
    )]
    New {
        #[arg(index = 1, help = "The collection name")]
        collection: String,
        #[arg(short, long = "field", value_name = "KEY=VALUE", help = "A field value")]
        fields: Vec<String>,
        #[arg(long, help = "Read the entry body from a file")]
        body_file: Option<PathBuf>,
    },
    #[command(name = "edit", about = "Update an entry")]
    Edit {
        #[arg(index = 1, help = "The collection name")]
        collection: String,
        #[arg(index = 2, help = "The entry slug (or file name for file collections)")]
        slug: String,
        #[arg(short, long = "field", value_name = "KEY=VALUE", help = "A field value")]
        fields: Vec<String>,
        #[arg(long, help = "Read the entry body from a file")]
        body_file: Option<PathBuf>,
    },
    #[command(name = "delete", about = "Delete an entry")]
    Delete {
        #[arg(index = 1, help = "The collection name")]
        collection: String,
        #[arg(index = 2, help = "The entry slug")]
        slug: String,
    },
    #[command(name = "upload", about = "Add a file to the media folder")]
    Upload {
        #[arg(index = 1, help = "The local file to upload")]
        file: PathBuf,
    },
    #[command(
        name = "login",
        about = "Check and store an access token",
        long_about = "This command checks the token given with --token (or FOLIO_TOKEN) \
        against the backend and stores it for later commands."
    )]
    Login,
    #[command(name = "logout", about = "Forget the stored access token")]
    Logout,
    #[command(
        name = "ls-tree",
        about = "List the branch head tree",
        long_about = "This command lists the entries of the tree at the branch head, or of one \
        directory of it."
    )]
    LsTree {
        #[arg(index = 1, help = "The directory to list")]
        dir: Option<String>,
        #[arg(short, long, help = "Recurse into sub-trees")]
        recursive: bool,
    },
    #[command(name = "cat-file", about = "Print the content of a file on the branch")]
    CatFile {
        #[arg(index = 1, help = "The repository path of the file")]
        path: String,
    },
    #[command(
        name = "hash-object",
        about = "Compute the blob id of a local file",
        long_about = "This command prints the Git blob id of a local file. It does not need a \
        configuration file."
    )]
    HashObject {
        #[arg(index = 1)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::HashObject { file } = &cli.command {
        hash_object(file, &mut std::io::stdout())?;
        return Ok(());
    }

    let repository =
        Repository::open(&cli.config, cli.token.clone(), Box::new(std::io::stdout())).await?;

    match &cli.command {
        Commands::Collections => repository.collections()?,
        Commands::Entries { collection } => repository.entries(collection).await?,
        Commands::Show {
            collection,
            slug,
            json,
        } => repository.show(collection, slug, *json).await?,
        Commands::New {
            collection,
            fields,
            body_file,
        } => {
            let args = FieldArgs {
                assignments: fields,
                body_file: body_file.as_deref(),
            };
            repository.new_entry(collection, args).await?
        }
        Commands::Edit {
            collection,
            slug,
            fields,
            body_file,
        } => {
            let args = FieldArgs {
                assignments: fields,
                body_file: body_file.as_deref(),
            };
            repository.edit_entry(collection, slug, args).await?
        }
        Commands::Delete { collection, slug } => repository.delete(collection, slug).await?,
        Commands::Upload { file } => repository.upload(file).await?,
        Commands::Login => repository.log_in().await?,
        Commands::Logout => repository.log_out()?,
        Commands::LsTree { dir, recursive } => {
            repository.ls_tree(dir.as_deref(), *recursive).await?
        }
        Commands::CatFile { path } => repository.cat_file(path).await?,
        // printed before the configuration is loaded
        Commands::HashObject { .. } => {}
    }

    Ok(())
}
