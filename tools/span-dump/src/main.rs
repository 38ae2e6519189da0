// Scene renderer and image comparison CLI for span-raster.
//
// Usage:
//   span-dump render <scene> <width> <height> [-o <output.pgm>]
//   span-dump compare <file_a> <file_b> [-d <diff.pgm>]
//   span-dump list

use span_dump::{compare_images, generate_diff_image, load_pgm, save_pgm};
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "render" => cmd_render(&args[2..]),
        "compare" => cmd_compare(&args[2..]),
        "list" => cmd_list(),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("span-dump - render span-raster scenes and compare images");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  render <scene> <width> <height> [-o <output.pgm>]");
    eprintln!("      Render a scene to a binary PGM file.");
    eprintln!();
    eprintln!("  compare <file_a> <file_b> [-d <diff.pgm>]");
    eprintln!("      Compare two PGM files pixel-by-pixel.");
    eprintln!();
    eprintln!("  list");
    eprintln!("      List available scene names.");
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    process::exit(1);
}

fn cmd_list() {
    println!("Available scenes:");
    for name in span_dump::render::available_scenes() {
        println!("  {}", name);
    }
}

fn cmd_render(args: &[String]) {
    if args.len() < 3 {
        fail("Usage: span-dump render <scene> <width> <height> [-o <output>]");
    }

    let scene = &args[0];
    let width: u32 = args[1].parse().unwrap_or_else(|_| fail("Invalid width"));
    let height: u32 = args[2].parse().unwrap_or_else(|_| fail("Invalid height"));

    let mut output_path: Option<String> = None;
    let mut i = 3;
    while i < args.len() {
        if args[i] == "-o" && i + 1 < args.len() {
            output_path = Some(args[i + 1].clone());
            i += 2;
        } else {
            eprintln!("Unknown option: {}", args[i]);
            i += 1;
        }
    }

    let output = output_path.unwrap_or_else(|| format!("{}_{}x{}.pgm", scene, width, height));

    println!("Rendering '{}' at {}x{}...", scene, width, height);

    let img = match span_dump::render::render_scene(scene, width, height) {
        Ok(Some(img)) => img,
        Ok(None) => fail(format!(
            "Unknown scene: '{}'. Use 'list' to see available scenes.",
            scene
        )),
        Err(e) => fail(format!("Rendering failed: {}", e)),
    };

    save_pgm(Path::new(&output), &img)
        .unwrap_or_else(|e| fail(format!("Failed to save image: {}", e)));
    println!("Saved: {}", output);
}

fn cmd_compare(args: &[String]) {
    if args.len() < 2 {
        fail("Usage: span-dump compare <file_a> <file_b> [-d <diff>]");
    }

    let path_a = &args[0];
    let path_b = &args[1];
    let mut diff_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-d" if i + 1 < args.len() => {
                diff_path = Some(args[i + 1].clone());
                i += 2;
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                i += 1;
            }
        }
    }

    let a = load_pgm(Path::new(path_a)).unwrap_or_else(|e| fail(format!("Failed to load file A: {}", e)));
    let b = load_pgm(Path::new(path_b)).unwrap_or_else(|e| fail(format!("Failed to load file B: {}", e)));

    let result = compare_images(&a, &b);
    println!("{}", result);

    if let Some(dp) = diff_path {
        if a.width == b.width && a.height == b.height {
            let diff = generate_diff_image(&a, &b);
            save_pgm(Path::new(&dp), &diff)
                .unwrap_or_else(|e| fail(format!("Failed to save diff image: {}", e)));
            println!("Diff saved: {}", dp);
        }
    }

    if !result.identical {
        process::exit(1);
    }
}
