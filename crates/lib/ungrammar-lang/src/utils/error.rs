use std::{
    collections::HashMap,
    ops::Range,
    path::PathBuf,
    sync::{LazyLock, Mutex},
};

use ariadne::{ColorGenerator, Config, Label, Report, ReportKind, Source};

/// An error that can be rendered against the source it was found in.
pub trait ReportableError: std::error::Error {
    /// message is used for reporting verbose message for `ariadne`.
    fn get_message(&self) -> String {
        self.to_string()
    }
    /// Byte ranges in the source, each with the text shown beside it.
    fn get_labels(&self) -> Vec<(Range<usize>, String)>;
}

/// ReportableError implements `PartialEq` mostly for testing purpose.
impl PartialEq for dyn ReportableError + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.get_labels() == other.get_labels()
    }
}

struct FileCache {
    pub storage: HashMap<PathBuf, ariadne::Source<String>>,
}

impl ariadne::Cache<PathBuf> for FileCache {
    type Storage = String;

    fn fetch(&mut self, id: &PathBuf) -> Result<&Source<Self::Storage>, impl std::fmt::Debug> {
        self.storage
            .get(id)
            .ok_or_else(|| format!("File not found: {}", id.display()))
    }

    fn display<'a>(&self, id: &'a PathBuf) -> Option<impl std::fmt::Display + 'a> {
        Some(id.display())
    }
}

static FILE_BUCKET: LazyLock<Mutex<FileCache>> = LazyLock::new(|| {
    Mutex::new(FileCache {
        storage: HashMap::new(),
    })
});

fn build_report<'a, E>(
    path: &PathBuf,
    e: &E,
    colors: &mut ColorGenerator,
    color: bool,
) -> Option<Report<'a, (PathBuf, Range<usize>)>>
where
    E: ReportableError + ?Sized,
{
    let rawlabels = e.get_labels();
    let first = rawlabels.first()?.0.clone();
    let labels = rawlabels.into_iter().map(|(span, message)| {
        Label::new((path.clone(), span))
            .with_message(message)
            .with_color(colors.next())
    });
    let report = Report::build(ReportKind::Error, (path.clone(), first))
        .with_config(Config::default().with_color(color))
        .with_message(e.get_message())
        .with_labels(labels)
        .finish();
    Some(report)
}

/// Print every error to stderr, with the source excerpt it points at.
pub fn report(src: &str, path: PathBuf, errs: &[Box<dyn ReportableError + '_>]) {
    let mut colors = ColorGenerator::new();
    let Ok(mut cache) = FILE_BUCKET.lock() else {
        log::error!("error report cache is poisoned");
        return;
    };
    let cache: &mut FileCache = &mut cache;
    cache
        .storage
        .insert(path.clone(), Source::from(src.to_string()));
    for e in errs {
        let Some(report) = build_report(&path, e.as_ref(), &mut colors, true) else {
            eprintln!("Error: {}", e.get_message());
            continue;
        };
        if let Err(err) = report.eprint(&mut *cache) {
            log::error!("failed to print report: {err}");
        }
    }
}

/// Render reports without colors, as `report` would print them.
pub fn report_to_string(src: &str, path: PathBuf, errs: &[Box<dyn ReportableError + '_>]) -> String {
    let mut colors = ColorGenerator::new();
    let mut cache = FileCache {
        storage: HashMap::from([(path.clone(), Source::from(src.to_string()))]),
    };
    let mut out = Vec::new();
    for e in errs {
        let Some(report) = build_report(&path, e.as_ref(), &mut colors, false) else {
            out.extend_from_slice(format!("Error: {}\n", e.get_message()).as_bytes());
            continue;
        };
        if let Err(err) = report.write(&mut cache, &mut out) {
            log::error!("failed to render report: {err}");
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub fn dump_to_string(errs: &[Box<dyn ReportableError + '_>]) -> String {
    let mut res = String::new();
    for e in errs {
        res += e.get_message().as_str();
        res += "\n";
    }
    res
}
