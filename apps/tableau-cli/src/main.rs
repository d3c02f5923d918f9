use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tableau_assets::AssetRoot;
use tableau_render::{
    BufferedText, DEFAULT_FPS_TARGET_ID, DEFAULT_SURFACE_ID, GraphBuilder, HeadlessSurface,
    SceneBootstrapper, SceneBuilder, SurfaceSize, build_demo_scene,
};
use tableau_scene::SceneSummary;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tableau-cli", about = "Headless tools for the tableau demo scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build the demo scene and describe it
    Scene {
        /// Print the whole scene as JSON
        #[arg(long)]
        json: bool,
        /// Describe only the mesh with this name
        #[arg(long)]
        mesh: Option<String>,
        /// Decode textures from this directory instead of leaving them unresolved
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Drive the render loop headlessly for a number of frames
    Run {
        /// Number of frames to render
        #[arg(short, long, default_value = "3")]
        frames: u64,
        /// Decode textures from this directory instead of leaving them unresolved
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Surface width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Surface height in pixels
        #[arg(long, default_value = "720")]
        height: u32,
    },
}

fn builder(assets: Option<PathBuf>) -> GraphBuilder {
    match assets {
        Some(dir) => GraphBuilder::with_assets(AssetRoot::new(dir)),
        None => GraphBuilder::new(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("tableau-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", tableau_scene::crate_info());
            println!("assets: {}", tableau_assets::crate_info());
            println!("input: {}", tableau_input::crate_info());
            println!("render: {}", tableau_render::crate_info());
        }
        Commands::Scene { json, mesh, assets } => {
            let mut builder = builder(assets);
            let engine = builder.create_engine(&HeadlessSurface::default())?;
            let demo = build_demo_scene(&mut builder, &engine, DEFAULT_SURFACE_ID)
                .context("failed to build the demo scene")?;

            if let Some(name) = mesh {
                let (id, mesh) = demo
                    .scene
                    .mesh_by_name(&name)
                    .with_context(|| format!("no mesh named '{name}'"))?;
                if json {
                    println!("{}", serde_json::to_string_pretty(mesh)?);
                } else {
                    println!("{name} [{}]", id.short());
                    println!("  shape:     {:?}", mesh.shape);
                    println!("  position:  {}", mesh.transform.position);
                    println!("  material:  {:?}", mesh.material);
                    println!("  caster:    {}", demo.scene.is_shadow_caster(id));
                    println!("  receiver:  {}", mesh.receive_shadows);
                }
            } else if json {
                println!("{}", serde_json::to_string_pretty(&demo.scene)?);
            } else {
                println!("{}", SceneSummary::of(&demo.scene));
                for (id, mesh) in demo.scene.meshes() {
                    let p = mesh.transform.position;
                    let role = if demo.scene.is_shadow_caster(*id) {
                        " caster"
                    } else if mesh.receive_shadows {
                        " receiver"
                    } else {
                        ""
                    };
                    println!(
                        "  {:<10} {:<8} ({:.1}, {:.1}, {:.1}){role}",
                        mesh.name,
                        mesh.shape.kind(),
                        p.x,
                        p.y,
                        p.z
                    );
                }
            }
        }
        Commands::Run {
            frames,
            assets,
            width,
            height,
        } => {
            let surface = HeadlessSurface::new(DEFAULT_SURFACE_ID, SurfaceSize::new(width, height));
            let mut boot = SceneBootstrapper::new(
                builder(assets),
                surface,
                BufferedText::new(DEFAULT_FPS_TARGET_ID),
            )
            .context("failed to start the scene")?;

            for frame in 1..=frames {
                boot.tick()?;
                println!(
                    "frame {frame}: {} ({:.2} ms)",
                    boot.fps_display().text(),
                    boot.engine().frame_time_ms()
                );
            }
            boot.stop();

            print!("{}", boot.engine().output());
        }
    }

    Ok(())
}
