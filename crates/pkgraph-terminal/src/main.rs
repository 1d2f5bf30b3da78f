mod image;

use image::ImageSpecifier;
use pkgraph_core::package::VersionSpecifier;

#[tokio::main]
async fn main() {
	env_logger::init();
	std::process::exit(run().await);
}

async fn run() -> i32 {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",         "Show help");
		opts.optmulti("r", "repository",   "Repositories to use for resolving the image", "URL");
		opts.optopt(  "",  "os",           "Specify which operating system to resolve packages for", "OS");
		opts.optopt(  "",  "architecture", "Specify which architecture to resolve packages for", "ARCH");
		opts.optflag( "",  "dry-run",      "Only print the result, don't write the image");
		opts.optflag( "",  "merge",        "Merge with the image already in the target directory");
		opts.optopt(  "t", "target",       "Directory the resolved image is written to", "DIR");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return 2 }
		};

		if parsed_options.opt_present("h") {
			eprintln!("{}", opts.usage("Usage: pkgraph install <image> [options]"));
			return 0;
		}

		parsed_options
	};

	if parsed_options.free.first().map(String::as_str) != Some("install") {
		log::error!("No action given. try `pkgraph install <image>`.");
		return 2;
	}
	let image_argument = match parsed_options.free.get(1) {
		Some(arg) => arg,
		None => { log::error!("Image specification not provided."); return 2 },
	};

	let config = pkgraph_core::Config::load_from_disk().unwrap_or_else(|e| {
		log::warn!("Failed to read config file: {}", e);
		log::warn!("Using default config.");
		pkgraph_core::Config::default()
	});

	match install(&config, image_argument, &parsed_options).await {
		Ok(_) => 0,
		Err(Error::Resolve(e)) => {
			log::error!("Unable to resolve image");
			for line in &e.errors {
				log::error!("- {}", line);
			}
			1
		}
		Err(e) => {
			log::error!("{}", e);
			1
		}
	}
}

async fn install(config: &pkgraph_core::Config, image_argument: &str, options: &getopts::Matches) -> Result<(), Error> {
	/* the image argument is a file holding the specification or the specification itself */
	let image_string = {
		let path = std::path::Path::new(image_argument);
		if path.is_file() {
			std::fs::read_to_string(path)?
		} else {
			image_argument.to_string()
		}
	};
	let mut image = ImageSpecifier::from_string(&image_string)?;

	/* repository precedence: command line overrides the image, the image overrides the config */
	let cli_repositories = options.opt_strs("r");
	if !cli_repositories.is_empty() {
		image.repositories = cli_repositories;
	} else if image.repositories.is_empty() {
		image.repositories = config.repositories().to_vec();
	}
	if let Some(os) = options.opt_str("os") {
		image.os = Some(os);
	}
	if let Some(architecture) = options.opt_str("architecture") {
		image.architecture = Some(architecture);
	}
	if image.repositories.is_empty() {
		return Err(Error::NoRepositories);
	}

	let sources: Vec<String> = {
		let mut filters = Vec::new();
		if let Some(os) = &image.os {
			filters.push(("os", os.as_str()));
		}
		if let Some(architecture) = &image.architecture {
			filters.push(("architecture", architecture.as_str()));
		}
		image.repositories.iter()
			.map(|source| pkgraph_core::repository::index_url_with_filters(source, &filters))
			.collect()
	};
	let mut graph = pkgraph_core::repository::build_graph(&sources).await?;
	log::debug!("graph built with {} releases", graph.count());

	/* cache the merged catalog for tooling that wants it without a refetch */
	if std::fs::create_dir_all(config.cache_dir()).is_ok() {
		if let Err(e) = graph.save_to_disk(config.cache_dir().join("catalog.bin")) {
			log::debug!("failed to cache catalog: {}", e);
		}
	}

	let target = std::path::PathBuf::from(options.opt_str("t").unwrap_or_else(|| ".".to_string()));
	let image_file = target.join("image.json");

	/* when merging, the packages already deployed are locked and also become requirements */
	let mut requirements = image.packages.clone();
	let mut fixed = Vec::new();
	if options.opt_present("merge") && image_file.is_file() {
		let deployed = ImageSpecifier::from_string(&std::fs::read_to_string(&image_file)?)?;
		for package in deployed.packages {
			if !requirements.iter().any(|p| p.name == package.name) {
				requirements.push(package.clone());
			}
			fixed.push(package);
		}
	}

	let resolved = image::resolve(&mut graph, &requirements, &fixed)?;
	log::debug!("resolution done");

	if options.opt_present("dry-run") {
		log::info!("Resolved packages:");
		for package in &resolved {
			log::info!("   {}:    {}", package.name, package.version);
		}
		return Ok(());
	}

	let document = serde_json::json!({
		"packages": resolved.iter().map(|package| serde_json::json!({
			"name": package.name,
			"version": VersionSpecifier::exact(&package.version).to_string(),
		})).collect::<Vec<_>>(),
	});
	std::fs::create_dir_all(&target)?;
	std::fs::write(&image_file, serde_json::to_string_pretty(&document)?)?;
	log::info!("Image with {} packages written to {}", resolved.len(), image_file.display());
	Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("pkgraph error: {0}")]
	Core(#[from] pkgraph_core::Error),
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("invalid image specification: {0}")]
	ImageSpec(String),
	#[error("no repositories given by the image, the command line or the config")]
	NoRepositories,
	#[error(transparent)]
	Resolve(#[from] image::ResolveError),
}
