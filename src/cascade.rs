//! Dependent-selection state machine for the catalog hierarchy.
//!
//! Project → Building → Apartment, with optional Storage/Parking/
//! Commercial branches attached at the project level. Choosing a parent
//! clears every descendant selection and option set in the same logical
//! update, then refetches the child sets.
//!
//! Transitions are split so the caller owns the await point:
//!
//! 1. `choose_*` runs synchronously — it mutates the selection, marks the
//!    affected levels [`Resource::Loading`] and hands back a
//!    [`FetchTicket`] stamped with the current generation.
//! 2. The caller runs [`FetchRequest::run`] against the client.
//! 3. [`SelectionCascade::commit`] applies the outcome only if the
//!    ticket's generation is still current; a response to a superseded
//!    transition is discarded, never merged. This is the whole
//!    cancellation story: no in-flight future is aborted, its result just
//!    stops mattering.

use crate::api::models::{ColumnId, ItemId};
use crate::api::{CatalogClient, Transport};
use crate::error::RemoteError;
use crate::options::OptionSet;
use crate::resource::Resource;

/// Current selection, one field per catalog level.
///
/// Invariant: `building` implies `project`, `apartment` implies
/// `building`. Maintained by construction — ancestor changes always clear
/// descendants before anything else observes the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub project: Option<ItemId>,
    pub building: Option<ItemId>,
    pub apartment: Option<ItemId>,
    pub storage: Option<ItemId>,
    pub parking: Option<ItemId>,
    pub commercial: Option<ItemId>,
}

/// A cascade fetch the caller still has to run.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    pub request: FetchRequest,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    /// Resolve a project's four unit relations into option sets.
    ProjectChildren(ItemId),
    /// Resolve a building's apartments, labels from the unit-number column.
    BuildingApartments(ItemId),
}

/// Result of running a [`FetchRequest`]; applied via
/// [`SelectionCascade::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    ProjectChildren {
        buildings: OptionSet,
        storages: OptionSet,
        parkings: OptionSet,
        commercials: OptionSet,
    },
    BuildingApartments { apartments: OptionSet },
}

impl FetchRequest {
    pub async fn run<T: Transport>(
        &self,
        client: &CatalogClient<T>,
    ) -> Result<FetchOutcome, RemoteError> {
        match *self {
            FetchRequest::ProjectChildren(project) => {
                let columns = {
                    let c = &client.config().columns;
                    [
                        c.project_to_buildings.clone(),
                        c.project_to_storage.clone(),
                        c.project_to_parking.clone(),
                        c.project_to_commercial.clone(),
                    ]
                };
                let linked = client.get_linked_ids(project, &columns).await?;
                let ids = |column: &ColumnId| linked.get(column).cloned().unwrap_or_default();

                // Four name lookups in flight at once, joined before any
                // visible effect: either all sets arrive or none do.
                let ids0 = ids(&columns[0]);
                let ids1 = ids(&columns[1]);
                let ids2 = ids(&columns[2]);
                let ids3 = ids(&columns[3]);
                let (buildings, storages, parkings, commercials) = futures::try_join!(
                    client.get_names(&ids0),
                    client.get_names(&ids1),
                    client.get_names(&ids2),
                    client.get_names(&ids3),
                )?;

                Ok(FetchOutcome::ProjectChildren {
                    buildings: OptionSet::sorted(buildings),
                    storages: OptionSet::sorted(storages),
                    parkings: OptionSet::sorted(parkings),
                    commercials: OptionSet::sorted(commercials),
                })
            }
            FetchRequest::BuildingApartments(building) => {
                let config = client.config();
                let relation = [config.columns.building_to_apartments.clone()];
                let linked = client.get_linked_ids(building, &relation).await?;
                let ids = linked.get(&relation[0]).cloned().unwrap_or_default();

                let labeled = client
                    .get_labeled(&ids, &config.columns.apartment_number_text)
                    .await?;
                Ok(FetchOutcome::BuildingApartments {
                    apartments: OptionSet::sorted_with_labels(labeled),
                })
            }
        }
    }
}

/// The dependent-selection state machine.
pub struct SelectionCascade {
    state: SelectionState,
    generation: u64,
    projects: Resource<OptionSet>,
    buildings: Resource<OptionSet>,
    apartments: Resource<OptionSet>,
    storages: Resource<OptionSet>,
    parkings: Resource<OptionSet>,
    commercials: Resource<OptionSet>,
}

impl Default for SelectionCascade {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionCascade {
    pub fn new() -> Self {
        Self {
            state: SelectionState::default(),
            generation: 0,
            projects: Resource::NotAsked,
            buildings: Resource::NotAsked,
            apartments: Resource::NotAsked,
            storages: Resource::NotAsked,
            parkings: Resource::NotAsked,
            commercials: Resource::NotAsked,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn projects(&self) -> &Resource<OptionSet> {
        &self.projects
    }

    pub fn buildings(&self) -> &Resource<OptionSet> {
        &self.buildings
    }

    pub fn apartments(&self) -> &Resource<OptionSet> {
        &self.apartments
    }

    pub fn storages(&self) -> &Resource<OptionSet> {
        &self.storages
    }

    pub fn parkings(&self) -> &Resource<OptionSet> {
        &self.parkings
    }

    pub fn commercials(&self) -> &Resource<OptionSet> {
        &self.commercials
    }

    /// Load the full projects catalog (paginated) in insertion order.
    /// Startup step, not a cascade transition: nothing can be in flight.
    pub async fn load_projects<T: Transport>(
        &mut self,
        client: &CatalogClient<T>,
    ) -> Result<(), RemoteError> {
        self.projects = Resource::Loading;
        match client.list_all(client.config().boards.planning).await {
            Ok(items) => {
                self.projects = Resource::Success(OptionSet::in_catalog_order(items));
                Ok(())
            }
            Err(e) => {
                self.projects = Resource::Failure(e.to_string());
                Err(e)
            }
        }
    }

    /// Choose or clear the project. Clearing resets the machine to empty;
    /// choosing clears every descendant and starts the child fetch. Either
    /// way the generation advances, so any in-flight fetch is obsolete.
    pub fn choose_project(&mut self, id: Option<ItemId>) -> Option<FetchTicket> {
        self.generation += 1;
        self.state.building = None;
        self.state.apartment = None;
        self.state.storage = None;
        self.state.parking = None;
        self.state.commercial = None;
        self.apartments = Resource::NotAsked;

        match id {
            None => {
                self.state.project = None;
                self.buildings = Resource::NotAsked;
                self.storages = Resource::NotAsked;
                self.parkings = Resource::NotAsked;
                self.commercials = Resource::NotAsked;
                None
            }
            Some(project) => {
                self.state.project = Some(project);
                self.buildings = Resource::Loading;
                self.storages = Resource::Loading;
                self.parkings = Resource::Loading;
                self.commercials = Resource::Loading;
                Some(FetchTicket {
                    generation: self.generation,
                    request: FetchRequest::ProjectChildren(project),
                })
            }
        }
    }

    /// Choose or clear the building; symmetric one level down.
    pub fn choose_building(&mut self, id: Option<ItemId>) -> Option<FetchTicket> {
        if id.is_some() && self.state.project.is_none() {
            log::warn!("building chosen with no project selected, ignoring");
            return None;
        }

        self.generation += 1;
        self.state.apartment = None;

        match id {
            None => {
                self.state.building = None;
                self.apartments = Resource::NotAsked;
                None
            }
            Some(building) => {
                self.state.building = Some(building);
                self.apartments = Resource::Loading;
                Some(FetchTicket {
                    generation: self.generation,
                    request: FetchRequest::BuildingApartments(building),
                })
            }
        }
    }

    /// Leaf transition: no cascade, no fetch.
    pub fn choose_apartment(&mut self, id: Option<ItemId>) {
        if id.is_some() && self.state.building.is_none() {
            log::warn!("apartment chosen with no building selected, ignoring");
            return;
        }
        self.state.apartment = id;
    }

    pub fn choose_storage(&mut self, id: Option<ItemId>) {
        if id.is_some() && self.state.project.is_none() {
            log::warn!("storage chosen with no project selected, ignoring");
            return;
        }
        self.state.storage = id;
    }

    pub fn choose_parking(&mut self, id: Option<ItemId>) {
        if id.is_some() && self.state.project.is_none() {
            log::warn!("parking chosen with no project selected, ignoring");
            return;
        }
        self.state.parking = id;
    }

    pub fn choose_commercial(&mut self, id: Option<ItemId>) {
        if id.is_some() && self.state.project.is_none() {
            log::warn!("commercial unit chosen with no project selected, ignoring");
            return;
        }
        self.state.commercial = id;
    }

    /// Apply a finished fetch. Returns whether it was applied; a ticket
    /// from a superseded transition is discarded untouched.
    pub fn commit(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchOutcome, RemoteError>,
    ) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "discarding stale fetch (generation {} < {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        match (ticket.request, result) {
            (
                FetchRequest::ProjectChildren(_),
                Ok(FetchOutcome::ProjectChildren {
                    buildings,
                    storages,
                    parkings,
                    commercials,
                }),
            ) => {
                self.buildings = Resource::Success(buildings);
                self.storages = Resource::Success(storages);
                self.parkings = Resource::Success(parkings);
                self.commercials = Resource::Success(commercials);
            }
            (FetchRequest::ProjectChildren(_), Err(e)) => {
                let message = e.to_string();
                self.buildings = Resource::Failure(message.clone());
                self.storages = Resource::Failure(message.clone());
                self.parkings = Resource::Failure(message.clone());
                self.commercials = Resource::Failure(message);
            }
            (
                FetchRequest::BuildingApartments(_),
                Ok(FetchOutcome::BuildingApartments { apartments }),
            ) => {
                self.apartments = Resource::Success(apartments);
            }
            (FetchRequest::BuildingApartments(_), Err(e)) => {
                self.apartments = Resource::Failure(e.to_string());
            }
            (request, Ok(outcome)) => {
                // A mismatched pair means the caller crossed tickets.
                log::warn!("dropping outcome {:?} for request {:?}", outcome, request);
                return false;
            }
        }
        true
    }
}
