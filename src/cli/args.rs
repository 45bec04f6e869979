//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::process::{DEFAULT_ELEVATE, DEFAULT_RUNTIME};

#[derive(Parser, Debug)]
#[command(name = "crane")]
#[command(author, version, about = "Declarative orchestration of Docker containers", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Directory holding the Cranefile, the state file and id files
    #[arg(long, global = true, env = "CRANE_WORKDIR", default_value = ".")]
    pub workdir: PathBuf,

    /// Container runtime binary
    #[arg(long, global = true, env = "CRANE_RUNTIME", default_value = DEFAULT_RUNTIME)]
    pub runtime: String,

    /// Privilege elevation wrapper put in front of every runtime invocation
    #[arg(long, global = true, env = "CRANE_ELEVATE", default_value = DEFAULT_ELEVATE)]
    pub elevate: String,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SubCommand {
    /// Write an example Cranefile.toml and an empty state file
    Create,

    /// Build images from the Dockerfiles of the chosen containers
    Build {
        /// Build the images of all containers
        #[arg(short, long)]
        all: bool,

        /// Containers whose images to build
        names: Vec<String>,
    },

    /// Start daemonized containers
    Start {
        /// Start all daemonized containers
        #[arg(short, long)]
        all: bool,

        /// Assume the image exists on this host, never build it
        #[arg(short, long)]
        force: bool,

        /// Containers to start
        names: Vec<String>,
    },

    /// Execute commands per container
    Run {
        /// Comma-separated names of images to save the containers as, in order
        #[arg(short, long, value_name = "IMAGES")]
        save: Option<String>,

        /// Commit every container over its configured image afterwards
        #[arg(short, long)]
        update: bool,

        /// Assume the image exists on this host, never build it
        #[arg(short, long)]
        force: bool,

        /// `<container>:<label1>,<label2>` or `<container>:#<shell command>`
        #[arg(value_name = "CONTAINER:COMMANDS")]
        targets: Vec<String>,
    },

    /// Execute commands in all containers
    Runall {
        /// `;`-separated command labels to run
        #[arg(short, long)]
        commands: Option<String>,

        /// Own shell command to run
        #[arg(short, long)]
        own: Option<String>,

        /// `;`-separated containers to run in
        #[arg(short = 'l', long = "list", value_name = "CONTAINERS")]
        containers: Option<String>,

        /// Commit every container over its configured image afterwards
        #[arg(short, long)]
        update: bool,

        /// Assume the image exists on this host, never build it
        #[arg(short, long)]
        force: bool,
    },

    /// Open an interactive shell in a container
    Enter {
        /// Assume the image exists on this host, never build it
        #[arg(short, long)]
        force: bool,

        /// The container to enter
        names: Vec<String>,
    },

    /// Commit containers into images
    Freeze {
        /// Freeze all containers
        #[arg(short, long)]
        all: bool,

        /// `<container>` or `<container>::<image>`
        #[arg(value_name = "CONTAINER[::IMAGE]")]
        targets: Vec<String>,
    },

    /// Kill and remove containers started by crane
    Destroy {
        /// Containers to destroy; all of them when omitted
        names: Vec<String>,
    },

    /// Pull images from the public registry
    Pull {
        /// Pull the images of all containers
        #[arg(short, long)]
        all: bool,

        images: Vec<String>,
    },

    /// Remove images from this host
    Rmi {
        /// Remove the images of all containers
        #[arg(short, long)]
        all: bool,

        images: Vec<String>,
    },

    /// List the containers recorded in the state file
    Status,
}
