//! The set of containers a native connector serves, and path resolution
//! across them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use vol_connector::{Location, LocationParams, PropertyList, VolError, VolResult};
use vol_token::TokenCodec;
use vol_types::{Address, AddressWidth};

use crate::config::NativeConfig;
use crate::container::{read, Container, FileRef, LinkRecord, StoredLink};
use crate::object::NativeObject;

/// Named in-memory containers.
///
/// Containers outlive the handles opened on them: closing a file handle
/// leaves the container in the store, the way a file stays on disk.
#[derive(Debug)]
pub struct NativeStore {
    config: NativeConfig,
    containers: RwLock<HashMap<String, FileRef>>,
    next_fileno: AtomicU64,
}

impl Default for NativeStore {
    fn default() -> Self {
        Self::new(NativeConfig::default())
    }
}

fn poisoned(e: impl std::fmt::Display) -> VolError {
    VolError::Backend(format!("container registry lock poisoned: {e}"))
}

impl NativeStore {
    pub fn new(config: NativeConfig) -> Self {
        Self {
            config,
            containers: RwLock::new(HashMap::new()),
            next_fileno: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &NativeConfig {
        &self.config
    }

    /// Create a new, empty container.
    pub fn create(
        &self,
        name: &str,
        width: Option<AddressWidth>,
        track_order: Option<bool>,
    ) -> VolResult<FileRef> {
        let mut containers = self.containers.write().map_err(poisoned)?;
        if containers.contains_key(name) {
            return Err(VolError::AlreadyExists(format!("container '{name}'")));
        }
        let width = width.unwrap_or(self.config.default_address_width);
        let fileno = self.next_fileno.fetch_add(1, Ordering::Relaxed);
        let container = Container::new(
            name,
            fileno,
            width,
            self.config.superblock_size,
            track_order.unwrap_or(self.config.track_creation_order),
        )?;
        let file = Arc::new(RwLock::new(container));
        containers.insert(name.to_string(), Arc::clone(&file));
        tracing::debug!(name, fileno, %width, "created native container");
        Ok(file)
    }

    pub fn open(&self, name: &str) -> VolResult<FileRef> {
        let containers = self.containers.read().map_err(poisoned)?;
        containers
            .get(name)
            .cloned()
            .ok_or_else(|| VolError::NotFound(format!("container '{name}'")))
    }

    pub fn exists(&self, name: &str) -> VolResult<bool> {
        let containers = self.containers.read().map_err(poisoned)?;
        Ok(containers.contains_key(name))
    }

    pub fn names(&self) -> VolResult<Vec<String>> {
        let containers = self.containers.read().map_err(poisoned)?;
        let mut names: Vec<String> = containers.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Soft-link hop budget for one resolution.
    pub(crate) fn link_budget(&self, lapl: Option<&PropertyList>) -> usize {
        lapl.and_then(PropertyList::max_soft_links)
            .unwrap_or(self.config.max_soft_link_traversals)
    }

    // ----------------------------------------------------------------
    // Resolution
    // ----------------------------------------------------------------

    /// Resolve a location to the container and address of its target.
    pub(crate) fn locate(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
    ) -> VolResult<(FileRef, Address)> {
        let (file, start) = obj.position()?;
        match &params.location {
            Location::BySelf => Ok((file, start)),
            Location::ByName { name, lapl } => {
                let mut budget = self.link_budget(Some(lapl));
                self.resolve_path(&file, start, name, &mut budget)
            }
            Location::ByIndex {
                group,
                idx_type,
                order,
                n,
                lapl,
            } => {
                let mut budget = self.link_budget(Some(lapl));
                let (gfile, gaddr) = self.resolve_path(&file, start, group, &mut budget)?;
                let record = {
                    let c = read(&gfile)?;
                    let links = c.group(gaddr)?.ordered(*idx_type, *order);
                    usize::try_from(*n)
                        .ok()
                        .and_then(|i| links.get(i).map(|l| (*l).clone()))
                        .ok_or_else(|| VolError::bad_argument(format!("index {n} out of bound")))?
                };
                self.follow(&gfile, gaddr, &record.target, &mut budget)
            }
            Location::ByToken { token, .. } => {
                let addr = {
                    let c = read(&file)?;
                    let addr = TokenCodec::new(c.width()).decode(token);
                    c.header(addr)?;
                    addr
                };
                Ok((file, addr))
            }
        }
    }

    /// Walk `path` from `start`. Absolute paths start at the root.
    pub(crate) fn resolve_path(
        &self,
        file: &FileRef,
        start: Address,
        path: &str,
        budget: &mut usize,
    ) -> VolResult<(FileRef, Address)> {
        let mut cur = if path.starts_with('/') {
            read(file)?.root()
        } else {
            start
        };
        let mut file = Arc::clone(file);
        for component in path.split('/').filter(|c| !c.is_empty() && *c != ".") {
            let target = {
                let c = read(&file)?;
                let group = c.group(cur).map_err(|_| {
                    VolError::NotFound(format!("'{path}': '{component}' is not inside a group"))
                })?;
                group
                    .get(component)
                    .map(|l| l.target.clone())
                    .ok_or_else(|| VolError::NotFound(format!("'{path}': no link '{component}'")))?
            };
            let (next_file, next) = self.follow(&file, cur, &target, budget)?;
            file = next_file;
            cur = next;
        }
        Ok((file, cur))
    }

    /// Follow one link stored in the group at `group`.
    pub(crate) fn follow(
        &self,
        file: &FileRef,
        group: Address,
        target: &StoredLink,
        budget: &mut usize,
    ) -> VolResult<(FileRef, Address)> {
        match target {
            StoredLink::Hard(addr) => Ok((Arc::clone(file), *addr)),
            StoredLink::Soft(path) => {
                spend(budget)?;
                self.resolve_path(file, group, path, budget)
            }
            StoredLink::External { file: name, path } => {
                spend(budget)?;
                let other = self.open(name)?;
                let root = read(&other)?.root();
                self.resolve_path(&other, root, path, budget)
            }
        }
    }

    /// Resolve everything but the last component of `path`.
    ///
    /// Returns the container and address of the parent group and the final
    /// link name.
    pub(crate) fn resolve_parent<'p>(
        &self,
        file: &FileRef,
        start: Address,
        path: &'p str,
        budget: &mut usize,
    ) -> VolResult<(FileRef, Address, &'p str)> {
        let (parent, leaf) = split_parent(path)?;
        let (pfile, paddr) = self.resolve_path(file, start, parent, budget)?;
        read(&pfile)?.group(paddr)?;
        Ok((pfile, paddr, leaf))
    }

    /// The link record a by-name or by-index location names, without
    /// following it.
    pub(crate) fn locate_link(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
    ) -> VolResult<(FileRef, Address, LinkRecord)> {
        let (file, start) = obj.position()?;
        match &params.location {
            Location::ByName { name, lapl } => {
                let mut budget = self.link_budget(Some(lapl));
                let (pfile, paddr, leaf) = self.resolve_parent(&file, start, name, &mut budget)?;
                let record = read(&pfile)?
                    .group(paddr)?
                    .get(leaf)
                    .cloned()
                    .ok_or_else(|| VolError::NotFound(format!("link '{name}'")))?;
                Ok((pfile, paddr, record))
            }
            Location::ByIndex {
                group,
                idx_type,
                order,
                n,
                lapl,
            } => {
                let mut budget = self.link_budget(Some(lapl));
                let (gfile, gaddr) = self.resolve_path(&file, start, group, &mut budget)?;
                let record = {
                    let c = read(&gfile)?;
                    let links = c.group(gaddr)?.ordered(*idx_type, *order);
                    usize::try_from(*n)
                        .ok()
                        .and_then(|i| links.get(i).map(|l| (*l).clone()))
                        .ok_or_else(|| VolError::bad_argument(format!("index {n} out of bound")))?
                };
                Ok((gfile, gaddr, record))
            }
            _ => Err(VolError::bad_argument(
                "link operations need a by-name or by-index location",
            )),
        }
    }
}

fn spend(budget: &mut usize) -> VolResult<()> {
    if *budget == 0 {
        return Err(VolError::Backend("too many soft or external links".into()));
    }
    *budget -= 1;
    Ok(())
}

/// Split a path into its parent path and final component.
pub fn split_parent(path: &str) -> VolResult<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    let (parent, leaf) = match trimmed.rsplit_once('/') {
        Some(("", leaf)) => ("/", leaf),
        Some((parent, leaf)) => (parent, leaf),
        None => (".", trimmed),
    };
    if leaf.is_empty() || leaf == "." {
        return Err(VolError::bad_argument(format!(
            "path '{path}' does not end in a link name"
        )));
    }
    Ok((parent, leaf))
}
