use anyhow::{Context, Result, anyhow};
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::captions::Shaper;
use crate::config::{Layout, Settings};
use crate::{output, srt, walk};

const SUBTITLE_EXTENSION: &str = "srt";
const OUTPUT_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Converted { output: PathBuf, captions: usize },
    AlreadyExists { output: PathBuf },
    NotSubtitle,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub converted: usize,
    pub already_exists: usize,
    pub ignored: usize,
    pub dropped_blocks: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} file(s), {} already existed, {} ignored, {} block(s) dropped",
            self.converted, self.already_exists, self.ignored, self.dropped_blocks
        )
    }
}

pub struct Converter {
    output_dir: PathBuf,
    layout: Layout,
    shaper: Box<dyn Shaper>,
    summary: RunSummary,
}

impl Converter {
    pub fn new(settings: &Settings, shaper: Box<dyn Shaper>) -> Self {
        Self {
            output_dir: settings.output_dir.clone(),
            layout: settings.layout,
            shaper,
            summary: RunSummary::default(),
        }
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    // `base` only matters for the mirror layout
    pub fn output_path(&self, base: &Path, path: &Path) -> Result<PathBuf> {
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("{:?} has no file name", path))?;

        let relative = match self.layout {
            Layout::Flat => Path::new(file_name),
            Layout::Mirror => path
                .strip_prefix(base)
                .unwrap_or_else(|_| Path::new(file_name)),
        };

        Ok(self
            .output_dir
            .join(relative)
            .with_extension(OUTPUT_EXTENSION))
    }

    pub fn convert(&mut self, base: &Path, path: &Path) -> Result<Outcome> {
        if !is_subtitle(path) {
            self.summary.ignored += 1;
            return Ok(Outcome::NotSubtitle);
        }

        let output = self.output_path(base, path)?;
        if output.exists() {
            println!("JSON file already exists: {}", output.display());
            self.summary.already_exists += 1;
            return Ok(Outcome::AlreadyExists { output });
        }

        let name = path.file_name().unwrap_or(path.as_os_str());
        println!("Processing SRT file: {}", name.to_string_lossy());

        let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        let content = String::from_utf8_lossy(&bytes);
        let parsed = srt::parse_srt(&content);

        for skipped in &parsed.skipped {
            log::warn!(
                "{}: dropped block {}: {}",
                path.display(),
                skipped.index,
                skipped.error
            );
        }
        self.summary.dropped_blocks += parsed.skipped.len();

        let document = self
            .shaper
            .shape(&parsed.cues)
            .with_context(|| format!("Failed to build captions for {:?}", path))?;
        let captions = document.as_array().map_or(0, Vec::len);

        output::write_json_atomic(&output, &document)?;
        log::debug!(
            "wrote {} {} caption(s) from {} cue(s) to {}",
            captions,
            self.shaper.name(),
            parsed.cues.len(),
            output.display()
        );

        self.summary.converted += 1;
        Ok(Outcome::Converted { output, captions })
    }
}

fn is_subtitle(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(SUBTITLE_EXTENSION))
}

pub fn run(settings: &Settings, paths: &[PathBuf], converter: &mut Converter) -> Result<()> {
    if paths.is_empty() {
        return convert_tree(converter, &settings.default_input_dir());
    }

    for arg in paths {
        let full_path = settings.resolve(arg);
        let metadata = fs::symlink_metadata(&full_path)
            .with_context(|| format!("Failed to find input {:?}", full_path))?;

        if metadata.is_dir() {
            convert_tree(converter, &full_path)?;
            continue;
        }

        println!("Processing file {}", full_path.display());
        let base = full_path.parent().unwrap_or(Path::new(""));
        converter.convert(base, &full_path)?;
    }

    Ok(())
}

fn convert_tree(converter: &mut Converter, dir: &Path) -> Result<()> {
    log::debug!("walking {}", dir.display());
    walk::walk(dir, &mut |path| converter.convert(dir, path).map(|_| ()))
}
