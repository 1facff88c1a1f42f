use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use clap::{crate_name, Parser};
use color_eyre::eyre::{Result, WrapErr};
use log::{debug, info, LevelFilter};
use verinfo::{Architecture, VersionDocument, VersionInfo};

fn main() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if cli.example {
        io::stdout().write_all(EXAMPLE.as_bytes())?;
        return Ok(());
    }

    let mut document = if cli.skip_versioninfo {
        VersionDocument::default()
    } else {
        read_document(&cli.config)?
    };
    cli.apply(&mut document);

    let info = VersionInfo::build(document)?;
    if let Some(path) = &cli.rust_file {
        info.write_source(path)?;
    }
    if let Some(path) = &cli.hex {
        info.write_hex(path)?;
    }

    let container = info.resources_with(!cli.skip_versioninfo)?;
    let objects = cli
        .outputs()
        .into_iter()
        .map(|(architecture, path)| -> Result<_> {
            Ok((path, architecture, container.serialize(architecture)?))
        })
        .collect::<Result<Vec<_>>>()?;

    for (path, architecture, data) in objects {
        fs::write(&path, data).wrap_err_with(|| format!("writing {}", path.display()))?;
        info!("wrote {} object to {}", architecture, path.display());
    }
    Ok(())
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_module(crate_name!(), level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn read_document(config: &str) -> Result<VersionDocument> {
    let document = if config == "-" {
        VersionDocument::from_reader(&mut io::stdin().lock())
    } else {
        VersionDocument::from_file(config)
    };
    let document = document.wrap_err_with(|| format!("reading {}", config))?;
    debug!("read version document from {}", config);
    Ok(document)
}

/// Build Windows version information, icon and manifest resources into linkable object files.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Version document, `-` to read from stdin
    #[arg(default_value = "versioninfo.json")]
    config: String,

    /// Print an example version document and exit
    #[arg(long)]
    example: bool,

    /// Output file name, ignored when writing multiple architectures
    #[arg(short, long, default_value = "resource.syso")]
    out: PathBuf,

    /// Rust source file embedding the version document
    #[arg(long)]
    rust_file: Option<PathBuf>,

    /// Write the raw version information to a file
    #[arg(long)]
    hex: Option<PathBuf>,

    /// Write resource_windows_<arch>.syso for 386, amd64, arm and arm64, ignores --out
    #[arg(long)]
    platform_specific: bool,

    /// Generate 64-bit objects
    #[arg(long = "64")]
    sixty_four: bool,

    /// Generate arm objects
    #[arg(long)]
    arm: bool,

    /// Icon file
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Manifest file
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Leave out the version information resource
    #[arg(long)]
    skip_versioninfo: bool,

    #[command(flatten)]
    strings: StringOverrides,

    /// Language id, ignored when 0
    #[arg(long)]
    translation: Option<u16>,

    /// Charset id, ignored when 0
    #[arg(long)]
    charset: Option<u16>,

    #[command(flatten)]
    versions: VersionOverrides,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}
impl Cli {
    fn architectures(&self) -> Vec<Architecture> {
        if self.platform_specific {
            return Architecture::ALL.to_vec();
        }
        vec![match (self.arm, self.sixty_four) {
            (true, true) => Architecture::Arm64,
            (true, false) => Architecture::Arm,
            (false, true) => Architecture::Amd64,
            (false, false) => Architecture::I386,
        }]
    }

    /// Returns the output path for each requested architecture.
    fn outputs(&self) -> Vec<(Architecture, PathBuf)> {
        let architectures = self.architectures();
        if let [architecture] = architectures[..] {
            return vec![(architecture, self.out.clone())];
        }
        architectures
            .into_iter()
            .map(|architecture| {
                (architecture, PathBuf::from(format!("resource_windows_{}.syso", architecture)))
            })
            .collect()
    }

    fn apply(&self, document: &mut VersionDocument) {
        if let Some(icon) = &self.icon {
            document.icon_path = Some(icon.clone());
        }
        if let Some(manifest) = &self.manifest {
            document.manifest_path = Some(manifest.clone());
        }
        self.strings.apply(document);
        if let Some(lang_id) = self.translation.filter(|&id| id > 0) {
            document.var_file_info.translation.lang_id = lang_id;
        }
        if let Some(charset_id) = self.charset.filter(|&id| id > 0) {
            document.var_file_info.translation.charset_id = charset_id;
        }
        self.versions.apply(document);
    }
}

#[derive(clap::Args)]
struct StringOverrides {
    /// StringFileInfo.Comments
    #[arg(long)]
    comment:         Option<String>,
    /// StringFileInfo.CompanyName
    #[arg(long)]
    company:         Option<String>,
    /// StringFileInfo.FileDescription
    #[arg(long)]
    description:     Option<String>,
    /// StringFileInfo.FileVersion
    #[arg(long)]
    file_version:    Option<String>,
    /// StringFileInfo.InternalName
    #[arg(long)]
    internal_name:   Option<String>,
    /// StringFileInfo.LegalCopyright
    #[arg(long)]
    copyright:       Option<String>,
    /// StringFileInfo.LegalTrademarks
    #[arg(long)]
    trademark:       Option<String>,
    /// StringFileInfo.OriginalFilename
    #[arg(long)]
    original_name:   Option<String>,
    /// StringFileInfo.PrivateBuild
    #[arg(long)]
    private_build:   Option<String>,
    /// StringFileInfo.ProductName
    #[arg(long)]
    product_name:    Option<String>,
    /// StringFileInfo.ProductVersion
    #[arg(long)]
    product_version: Option<String>,
    /// StringFileInfo.SpecialBuild
    #[arg(long)]
    special_build:   Option<String>,
}
impl StringOverrides {
    fn apply(&self, document: &mut VersionDocument) {
        let strings = &mut document.string_file_info;
        for (value, target) in [
            (&self.comment, &mut strings.comments),
            (&self.company, &mut strings.company_name),
            (&self.description, &mut strings.file_description),
            (&self.file_version, &mut strings.file_version),
            (&self.internal_name, &mut strings.internal_name),
            (&self.copyright, &mut strings.legal_copyright),
            (&self.trademark, &mut strings.legal_trademarks),
            (&self.original_name, &mut strings.original_filename),
            (&self.private_build, &mut strings.private_build),
            (&self.product_name, &mut strings.product_name),
            (&self.product_version, &mut strings.product_version),
            (&self.special_build, &mut strings.special_build),
        ] {
            if let Some(value) = value.as_ref().filter(|value| !value.is_empty()) {
                target.clone_from(value);
            }
        }
    }
}

#[derive(clap::Args)]
struct VersionOverrides {
    /// FileVersion.Major
    #[arg(long)]
    ver_major:         Option<u16>,
    /// FileVersion.Minor
    #[arg(long)]
    ver_minor:         Option<u16>,
    /// FileVersion.Patch
    #[arg(long)]
    ver_patch:         Option<u16>,
    /// FileVersion.Build
    #[arg(long)]
    ver_build:         Option<u16>,
    /// ProductVersion.Major
    #[arg(long)]
    product_ver_major: Option<u16>,
    /// ProductVersion.Minor
    #[arg(long)]
    product_ver_minor: Option<u16>,
    /// ProductVersion.Patch
    #[arg(long)]
    product_ver_patch: Option<u16>,
    /// ProductVersion.Build
    #[arg(long)]
    product_ver_build: Option<u16>,
}
impl VersionOverrides {
    fn apply(&self, document: &mut VersionDocument) {
        let info = &mut document.fixed_file_info;
        for (value, target) in [
            (self.ver_major, &mut info.file_version.major),
            (self.ver_minor, &mut info.file_version.minor),
            (self.ver_patch, &mut info.file_version.patch),
            (self.ver_build, &mut info.file_version.build),
            (self.product_ver_major, &mut info.product_version.major),
            (self.product_ver_minor, &mut info.product_version.minor),
            (self.product_ver_patch, &mut info.product_version.patch),
            (self.product_ver_build, &mut info.product_version.build),
        ] {
            if let Some(value) = value {
                *target = value;
            }
        }
    }
}

const EXAMPLE: &str = r#"{
	"FixedFileInfo": {
		"FileVersion": {
			"Major": 6,
			"Minor": 3,
			"Patch": 9600,
			"Build": 17284
		},
		"ProductVersion": {
			"Major": 6,
			"Minor": 3,
			"Patch": 9600,
			"Build": 17284
		},
		"FileFlagsMask": "3f",
		"FileFlags": "00",
		"FileOS": "040004",
		"FileType": "01",
		"FileSubType": "00"
	},
	"StringFileInfo": {
		"Comments": "",
		"CompanyName": "Company, Inc.",
		"FileDescription": "",
		"FileVersion": "6.3.9600.17284 (aaa.140822-1915)",
		"InternalName": "verinfo",
		"LegalCopyright": "© Author. Licensed under MIT.",
		"LegalTrademarks": "",
		"OriginalFilename": "verinfo",
		"PrivateBuild": "",
		"ProductName": "Version Info",
		"ProductVersion": "6.3.9600.17284",
		"SpecialBuild": ""
	},
	"VarFileInfo": {
		"Translation": {
			"LangID": "0409",
			"CharsetID": "04B0"
		}
	}
}
"#;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use rstest::rstest;
    use verinfo::{Architecture, FileVersion, Translation, VersionDocument};

    use super::Cli;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(["verinfo"].into_iter().chain(args.iter().copied())).unwrap()
    }

    #[rstest]
    #[case(&[], Architecture::I386)]
    #[case(&["--64"], Architecture::Amd64)]
    #[case(&["--arm"], Architecture::Arm)]
    #[case(&["--arm", "--64"], Architecture::Arm64)]
    fn single_architecture(#[case] args: &[&str], #[case] architecture: Architecture) {
        let cli = parse(args);
        assert_eq!(cli.architectures(), [architecture]);
        assert_eq!(cli.outputs(), [(architecture, PathBuf::from("resource.syso"))]);

        let cli = parse(&[args, &["-o", "out.syso"]].concat());
        assert_eq!(cli.outputs(), [(architecture, PathBuf::from("out.syso"))]);
    }

    #[test]
    fn platform_specific_outputs() {
        let cli = parse(&["--platform-specific", "--64", "-o", "out.syso"]);
        assert_eq!(cli.architectures(), Architecture::ALL);
        assert_eq!(
            cli.outputs(),
            [
                (Architecture::I386, PathBuf::from("resource_windows_386.syso")),
                (Architecture::Amd64, PathBuf::from("resource_windows_amd64.syso")),
                (Architecture::Arm, PathBuf::from("resource_windows_arm.syso")),
                (Architecture::Arm64, PathBuf::from("resource_windows_arm64.syso")),
            ]
        );
    }

    #[test]
    fn config_argument() {
        assert_eq!(parse(&[]).config, "versioninfo.json");
        assert_eq!(parse(&["-"]).config, "-");
        assert_eq!(parse(&["app.json"]).config, "app.json");
    }

    #[test]
    fn apply_overrides() {
        let cli = parse(&[
            "--icon",
            "app.ico",
            "--manifest",
            "app.manifest",
            "--comment",
            "hi",
            "--company",
            "",
            "--product-name",
            "Product",
            "--translation",
            "1031",
            "--ver-major",
            "9",
            "--product-ver-build",
            "7",
        ]);
        let mut document = VersionDocument::default();
        document.string_file_info.company_name = "Company".to_string();
        document.fixed_file_info.file_version = FileVersion::new(1, 2, 3, 4);
        document.var_file_info.translation = Translation::new(0x0409, 0x04b0);
        cli.apply(&mut document);

        assert_eq!(document.icon_path, Some(PathBuf::from("app.ico")));
        assert_eq!(document.manifest_path, Some(PathBuf::from("app.manifest")));
        assert_eq!(document.string_file_info.comments, "hi");
        assert_eq!(document.string_file_info.company_name, "Company", "empty overrides are ignored");
        assert_eq!(document.string_file_info.product_name, "Product");
        assert_eq!(document.fixed_file_info.file_version, FileVersion::new(9, 2, 3, 4));
        assert_eq!(document.fixed_file_info.product_version, FileVersion::new(0, 0, 0, 7));
        assert_eq!(document.var_file_info.translation, Translation::new(1031, 0x04b0));
    }

    #[test]
    fn apply_zero_translation() {
        let cli = parse(&["--translation", "0", "--charset", "0"]);
        let mut document = VersionDocument::default();
        document.var_file_info.translation = Translation::new(0x0409, 0x04b0);
        cli.apply(&mut document);
        assert_eq!(document.var_file_info.translation, Translation::new(0x0409, 0x04b0));
    }

    #[test]
    fn apply_nothing() {
        let mut document = VersionDocument::from_json(super::EXAMPLE).unwrap();
        let expected = document.clone();
        parse(&[]).apply(&mut document);
        assert_eq!(document, expected);
    }
}
