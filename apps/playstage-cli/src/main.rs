use clap::{Parser, Subcommand};
use glam::Vec2;
use playstage_assets::TextureCache;
use playstage_author::{EditorSurface, spawn_demo_scene};
use playstage_common::{Rect, WorldBounds};
use playstage_ecs::Role;
use playstage_kernel::World;
use playstage_render::{DrawSurface, RecordingSurface, SceneRenderer};
use playstage_tools::SceneInspector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "playstage-cli", about = "CLI tool for playstage operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory searched for demo textures
    #[arg(long, default_value = "assets")]
    asset_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and a demo scene summary
    Info,
    /// Run the demo scene headless for a number of fixed-step frames
    Simulate {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        frames: u32,
        /// Placement seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Dump the demo scene as JSON
    Dump {
        /// Placement seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Draw the demo scene into a recording surface and report what the
    /// renderer bridge did
    Render {
        /// Placement seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

const BOUNDS: WorldBounds = WorldBounds {
    width: 800.0,
    height: 600.0,
};

fn demo_world(asset_dir: &PathBuf, seed: u64) -> (World, EditorSurface) {
    let mut world = World::new();
    let mut editor = EditorSurface::new();
    let mut cache = TextureCache::new();
    let mut rng = StdRng::seed_from_u64(seed);
    spawn_demo_scene(&mut world, &mut editor, &mut cache, asset_dir, BOUNDS, &mut rng);
    (world, editor)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("playstage-cli v{}", env!("CARGO_PKG_VERSION"));
            let (world, _) = demo_world(&cli.asset_dir, 42);
            println!("{}", SceneInspector::summary(&world));
            for id in SceneInspector::list_entities(&world) {
                if let Some(info) = SceneInspector::inspect_entity(&world, id) {
                    println!("  {info}");
                }
            }
        }
        Commands::Simulate { frames, seed } => {
            println!("Headless simulation: seed={seed}, frames={frames}");
            let (mut world, _) = demo_world(&cli.asset_dir, seed);
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
            let mut score = 0;
            let dt = 1.0 / 60.0;

            // Steer the player to the right so something happens.
            if let Some(player) = world.find_role(Role::Player) {
                world.attach_velocity(player, playstage_ecs::Velocity::new(120.0, 0.0));
            }

            let mut collected = 0u32;
            let mut struck = 0u32;
            for _ in 0..frames {
                let report =
                    playstage_sim::run_frame(&mut world, BOUNDS, dt, &mut score, &mut rng);
                if report.collected {
                    collected += 1;
                }
                if report.struck {
                    struck += 1;
                }
            }

            println!("{}", SceneInspector::summary(&world));
            println!("score={score} collected={collected} struck={struck}");
        }
        Commands::Dump { seed } => {
            let (world, _) = demo_world(&cli.asset_dir, seed);
            let dump = SceneInspector::dump_json(&world);
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
        Commands::Render { seed } => {
            let (world, editor) = demo_world(&cli.asset_dir, seed);
            let renderer = SceneRenderer::new(BOUNDS);
            let mut surface = RecordingSurface::new(800.0, 600.0);

            let full = Rect::new(0.0, 0.0, 800.0, 600.0);
            let panel = Rect::new(500.0, 400.0, 250.0, 150.0);
            renderer.draw_world_into(&mut surface, &world, editor.selection(), full);
            renderer.draw_world_into(&mut surface, &world, editor.selection(), panel);
            surface.present();

            println!("recorded {} surface ops", surface.ops().len());
            println!(
                "viewport after draws: {:?} (state-neutral: {})",
                surface.viewport(),
                surface.viewport() == full && surface.scale() == Vec2::ONE
            );
        }
    }

    Ok(())
}
