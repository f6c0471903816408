use frame_extractor::{
    extract_frame_to_file, ConfirmKind, ConfirmRequest, ExtractorConfig, Verbosity, SUCCESS_CODE,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

const USAGE: &str = "Usage: frame_extractor <file.mp4|url> <output.png> [options]
  --mult F              position among key frames, 0.0 first .. 1.0 last (default 1.0)
  --offset N            key frame index before --mult is applied, negative wraps (default -1)
  --frames-after N      samples decoded after the key frame (default 0)
  --limit-from-end N    samples at the end of the track never fetched (default 0)
  --chunk-size N        fetch granularity in bytes (default 10240)
  --chunk-limit N       maximum number of fetched chunks (default 1000)
  --verbose N           0 quiet .. 4 every read (default 1)
  --yes                 accept downloads above the soft thresholds without asking";

/// Ask on the terminal before crossing a soft threshold.
fn prompt(request: &ConfirmRequest) -> bool {
    if let Some(source) = &request.source_description {
        println!("{}", source);
    }
    let what = match request.kind {
        ConfirmKind::StscTable => "stsc size",
        ConfirmKind::DownloadSize => "download size",
    };
    println!(
        "warning!!! {} {:.2} MB above threshold.",
        what,
        request.byte_count as f64 / (1024.0 * 1024.0)
    );
    print!("proceed?(y/n) ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim() != "n",
        Err(_) => false,
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    match value.map(|v| v.parse::<T>()) {
        Some(Ok(parsed)) => parsed,
        _ => {
            eprintln!("Invalid or missing value for {}\n{}", flag, USAGE);
            process::exit(2);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("{}", USAGE);
        process::exit(2);
    }
    let source = &args[1];
    let output = Path::new(&args[2]);

    let mut config = ExtractorConfig::default();
    let mut assume_yes = false;
    let mut rest = args[3..].iter();
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--mult" => config.target_frame_mult = parse_value(flag, rest.next()),
            "--offset" => config.target_frame_offset = parse_value(flag, rest.next()),
            "--frames-after" => config.frames_after = parse_value(flag, rest.next()),
            "--limit-from-end" => config.frames_limit_from_end = parse_value(flag, rest.next()),
            "--chunk-size" => config.chunk_size = parse_value(flag, rest.next()),
            "--chunk-limit" => config.chunk_limit = parse_value(flag, rest.next()),
            "--verbose" => config.verbose = Verbosity::from_level(parse_value(flag, rest.next())),
            "--yes" => assume_yes = true,
            other => {
                eprintln!("Unknown option {}\n{}", other, USAGE);
                process::exit(2);
            }
        }
    }

    let result = if assume_yes {
        extract_frame_to_file(source, output, config, |_: &ConfirmRequest| true)
    } else {
        extract_frame_to_file(source, output, config, prompt)
    };

    let (status, message) = match result {
        Ok(outcome) => outcome,
        Err(e) => (e.status_code(), e.to_string()),
    };
    if status == SUCCESS_CODE {
        println!("✅ {}", message);
    } else {
        println!("❌ [{}] {}", status, message);
    }
    process::exit(status);
}
