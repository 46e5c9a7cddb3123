//! A filesystem-backed store for one student's catalog and plan.
//!
//! The [`Directory`] owns a data root holding one text file per record set.
//! It deals only in whole lines; all interpretation happens in the
//! [`catalog`](crate::storage::catalog) and [`plan`](crate::storage::plan)
//! modules.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{
    domain::{Catalog, PlanConfig, PlannerSession, SchedulePlan},
    storage::{
        catalog::{self, CatalogLoad},
        codec::CodecError,
        plan::{self, PlanLoad},
    },
};

const CATALOG_FILE: &str = "catalog.txt";
const PLAN_FILE: &str = "plan.txt";

/// Errors from loading stored records.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A record's outer framing is corrupt.
    #[error(transparent)]
    Corrupt(#[from] CodecError),
}

/// A filesystem-backed store of planning data.
#[derive(Debug, Clone)]
pub struct Directory {
    /// The root of the directory the data files are stored in.
    root: PathBuf,
}

impl Directory {
    /// Opens a store rooted at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the catalog, one record line per entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or the file cannot be
    /// written.
    #[instrument(skip(self, catalog), fields(root = %self.root.display()))]
    pub fn save_catalog(&self, catalog: &Catalog) -> io::Result<()> {
        self.write_lines(CATALOG_FILE, &catalog::encode_catalog(catalog))
    }

    /// Loads the catalog.
    ///
    /// A missing file is an empty catalog (first run). Locally corrupt
    /// records are skipped and counted on the returned [`CatalogLoad`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read, or
    /// [`LoadError::Corrupt`] on structural corruption.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_catalog(&self) -> Result<CatalogLoad, LoadError> {
        let Some(lines) = self.read_lines(CATALOG_FILE)? else {
            return Ok(CatalogLoad {
                catalog: Catalog::default(),
                skipped: 0,
            });
        };
        Ok(catalog::load_catalog(&lines)?)
    }

    /// Writes the plan and exemption list as a single record line.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or the file cannot be
    /// written.
    #[instrument(skip(self, plan), fields(root = %self.root.display()))]
    pub fn save_plan(&self, plan: &SchedulePlan) -> io::Result<()> {
        self.write_lines(PLAN_FILE, &[plan::encode_plan(plan)])
    }

    /// Loads the plan, resolving stored codes against `catalog`.
    ///
    /// A missing file is an empty plan. Structural corruption resets to an
    /// empty plan with a warning instead of failing the session; the
    /// returned [`PlanLoad`] records that the reset happened.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file cannot be read.
    #[instrument(skip(self, catalog, config), fields(root = %self.root.display()))]
    pub fn load_plan(&self, catalog: &Catalog, config: &PlanConfig) -> io::Result<PlanLoad> {
        let empty = |reset| PlanLoad {
            plan: SchedulePlan::new(config),
            skipped: 0,
            reset,
        };

        let Some(lines) = self.read_lines(PLAN_FILE)? else {
            return Ok(empty(false));
        };
        let Some(line) = lines.iter().find(|line| !line.trim().is_empty()) else {
            return Ok(empty(false));
        };

        match plan::decode_plan(line, catalog, config) {
            Ok(load) => Ok(load),
            Err(err) => {
                tracing::warn!(%err, "stored plan is corrupt; resetting to an empty plan");
                Ok(empty(true))
            }
        }
    }

    /// Loads a whole session: catalog, then the plan resolved against it.
    ///
    /// Structural catalog corruption is handled like plan corruption at the
    /// session boundary: warn and continue with an empty catalog (and
    /// therefore an empty plan) rather than crashing.
    ///
    /// # Errors
    ///
    /// Returns an error only if a file cannot be read.
    pub fn load_session(&self, config: PlanConfig) -> io::Result<PlannerSession> {
        let catalog = match self.load_catalog() {
            Ok(load) => {
                if load.skipped > 0 {
                    tracing::warn!(skipped = load.skipped, "catalog loaded with skipped records");
                }
                load.catalog
            }
            Err(LoadError::Io(err)) => return Err(err),
            Err(LoadError::Corrupt(err)) => {
                tracing::warn!(%err, "stored catalog is corrupt; starting with an empty catalog");
                Catalog::default()
            }
        };

        let plan = self.load_plan(&catalog, &config)?.plan;
        Ok(PlannerSession::from_parts(config, catalog, plan))
    }

    /// Saves a whole session: catalog and plan.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn save_session(&self, session: &PlannerSession) -> io::Result<()> {
        self.save_catalog(session.catalog())?;
        self.save_plan(session.plan())
    }

    fn write_lines(&self, name: &str, lines: &[String]) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)?;

        let file = File::create(self.root.join(name))?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()
    }

    fn read_lines(&self, name: &str) -> io::Result<Option<Vec<String>>> {
        match std::fs::read_to_string(self.root.join(name)) {
            Ok(content) => Ok(Some(content.lines().map(str::to_string).collect())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}
