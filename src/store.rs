use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::*;

/// Injected persistence backend. The engine mirrors grids into the
/// store after each reveal; in-memory state stays authoritative and a
/// failed write never rolls a reveal back.
pub trait GridStore {
    fn save_or_update(&mut self, grid: &Grid) -> Result<()>;
    fn all_grids(&self) -> Result<Vec<Grid>>;
    fn grid_by_id(&self, id: &str) -> Result<Grid>;
}

/// Lets a host keep a handle on a store that has been handed to the
/// engine (the engine is single-threaded, so shared ownership is
/// `Rc<RefCell<_>>`, not a lock).
impl<S: GridStore> GridStore for Rc<RefCell<S>> {
    fn save_or_update(&mut self, grid: &Grid) -> Result<()> {
        self.borrow_mut().save_or_update(grid)
    }

    fn all_grids(&self) -> Result<Vec<Grid>> {
        self.borrow().all_grids()
    }

    fn grid_by_id(&self, id: &str) -> Result<Grid> {
        self.borrow().grid_by_id(id)
    }
}

/// Discards writes and answers reads with nothing; the engine default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl GridStore for NullStore {
    fn save_or_update(&mut self, _grid: &Grid) -> Result<()> {
        Ok(())
    }

    fn all_grids(&self) -> Result<Vec<Grid>> {
        Ok(Vec::new())
    }

    fn grid_by_id(&self, id: &str) -> Result<Grid> {
        Err(GameError::Storage(format!("no grid with id {id}")))
    }
}

/// In-memory document store keyed by grid id, round-tripping grids
/// through JSON the way an external document backend would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    grids: HashMap<String, serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

fn storage_err(err: serde_json::Error) -> GameError {
    GameError::Storage(err.to_string())
}

impl GridStore for MemoryStore {
    fn save_or_update(&mut self, grid: &Grid) -> Result<()> {
        let doc = serde_json::to_value(grid).map_err(storage_err)?;
        self.grids.insert(grid.id().to_owned(), doc);
        Ok(())
    }

    fn all_grids(&self) -> Result<Vec<Grid>> {
        self.grids
            .values()
            .map(|doc| serde_json::from_value(doc.clone()).map_err(storage_err))
            .collect()
    }

    fn grid_by_id(&self, id: &str) -> Result<Grid> {
        let doc = self
            .grids
            .get(id)
            .ok_or_else(|| GameError::Storage(format!("no grid with id {id}")))?;
        serde_json::from_value(doc.clone()).map_err(storage_err)
    }
}
