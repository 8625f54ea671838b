use log::{error, info};
use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};
use serde::Deserialize;
use simplelog::{LevelFilter, SimpleLogger};
use structopt::StructOpt;

use std::{fs, process, result, time};

use rbstore::{Config, Rbt};

/// Command line options.
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(long = "seed", default_value = "0")]
    seed: u64,

    #[structopt(long = "profile", default_value = "")]
    profile: String,

    #[structopt(long = "verbose")]
    verbose: bool,
}

/// Workload profile, loaded from toml file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Profile {
    name: String,
    allow_duplicates: bool,
    key_max: u64,
    loads: usize,
    gets: usize,
    dels: usize,
    validate: bool,
}

impl Default for Profile {
    fn default() -> Profile {
        Profile {
            name: "rbt-perf".to_string(),
            allow_duplicates: true,
            key_max: u64::MAX,
            loads: 1_000_000,
            gets: 1_000_000,
            dels: 100_000,
            validate: true,
        }
    }
}

impl Profile {
    fn load(opts: &Opt) -> result::Result<Profile, String> {
        if opts.profile.is_empty() {
            return Ok(Profile::default());
        }
        let text = fs::read_to_string(&opts.profile).map_err(|e| e.to_string())?;
        let profile: Profile = toml::from_str(&text).map_err(|e| e.to_string())?;
        if profile.key_max == 0 {
            return Err("key_max must be non-zero".to_string());
        }
        Ok(profile)
    }

    fn to_config(&self) -> Config {
        let mut config = Config::new(&self.name);
        config.set_allow_duplicates(self.allow_duplicates);
        config
    }
}

fn main() {
    let mut opts = Opt::from_args();
    if opts.seed == 0 {
        opts.seed = random();
    }

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::init(level, simplelog::Config::default()).ok();

    if let Err(err) = perf(opts) {
        error!("rbt-perf: {}", err);
        process::exit(1);
    }
}

fn perf(opts: Opt) -> result::Result<(), String> {
    let profile = Profile::load(&opts)?;
    info!("rbt-perf seed:{} profile:{:?}", opts.seed, profile);

    let mut rng = SmallRng::seed_from_u64(opts.seed);
    let mut index: Rbt<u64> = Rbt::from_config(profile.to_config());
    let gen_key = |rng: &mut SmallRng| rng.gen::<u64>() % profile.key_max;

    let (start, mut rejects) = (time::Instant::now(), 0);
    for _ in 0..profile.loads {
        if index.insert(gen_key(&mut rng)).is_err() {
            rejects += 1;
        }
    }
    info!(
        "loaded {} keys in {:?}, rejected {}",
        index.len(),
        start.elapsed(),
        rejects
    );

    let (start, mut found) = (time::Instant::now(), 0);
    for _ in 0..profile.gets {
        if index.search(&gen_key(&mut rng)).is_some() {
            found += 1;
        }
    }
    info!("{} gets in {:?}, found {}", profile.gets, start.elapsed(), found);

    let (start, mut missing) = (time::Instant::now(), 0);
    for _ in 0..profile.dels {
        if index.delete(&gen_key(&mut rng)).is_err() {
            missing += 1;
        }
    }
    info!("{} dels in {:?}, missing {}", profile.dels, start.elapsed(), missing);

    let stats = if profile.validate {
        let start = time::Instant::now();
        let stats = index.validate().map_err(|e| e.to_string())?;
        info!("validated in {:?}", start.elapsed());
        stats
    } else {
        index.to_stats()
    };
    println!("{}", stats);

    Ok(())
}
