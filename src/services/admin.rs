//! Admin dashboard panels and the per-session workspace that holds them.
//!
//! Panel state lives in server memory between requests so that mutations can
//! be applied optimistically and rendered on the following redirect without
//! refetching. A tab is (re)mounted only when it is opened, when it was never
//! loaded, or on an explicit refresh.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::api::{
    BookingReader, EventQuery, EventReader, EventWriter, LocationReader, LocationWriter,
    UserReader,
};
use crate::domain::booking::Booking;
use crate::domain::event::{Event, EventPayload};
use crate::domain::location::{Location, NewLocation};
use crate::domain::types::{EventId, LocationId, UserId};
use crate::domain::user::User;
use crate::dto::admin::{DashboardData, Draft, PastEventRow, PendingDeletion, UserBookings, UserRow};
use crate::forms::FormFields;
use crate::forms::event::{EventForm, OTHER_LOCATION};
use crate::forms::location::LocationForm;
use crate::services::events::{location_names, partition_events};
use crate::services::roster::RosterCache;
use crate::services::scope::ViewScope;
use crate::services::{ServiceError, ServiceResult};
use crate::session::AdminTab;

pub const EVENTS_FETCH_FAILED: &str = "Failed to fetch events";
pub const PAST_EVENTS_FETCH_FAILED: &str = "Failed to fetch past events";
pub const ROSTER_FETCH_FAILED: &str = "Failed to fetch bookings for this event";
pub const EVENT_CREATED: &str = "Event created successfully";
pub const EVENT_UPDATED: &str = "Event updated successfully";
pub const EVENT_DELETED: &str = "Event deleted successfully";
pub const EVENT_SAVE_FAILED: &str = "Failed to save event";
pub const EVENT_DELETE_FAILED: &str = "Failed to delete event";
pub const LOCATIONS_FETCH_FAILED: &str = "Failed to fetch locations";
pub const LOCATION_FIELDS_REQUIRED: &str = "Both name and displayName are required";
pub const LOCATION_ADDED: &str = "Location added successfully";
pub const LOCATION_ADD_FAILED: &str = "Failed to add location";
pub const LOCATION_DELETED: &str = "Location deleted successfully";
pub const LOCATION_DELETE_FAILED: &str = "Failed to delete location";
pub const USERS_FETCH_FAILED: &str = "Failed to load users";
pub const USER_BOOKINGS_FAILED: &str = "Failed to fetch user bookings";

const FIX_FIELDS: &str = "Please fix the highlighted fields";
const NO_MOBILE: &str = "--";

/// Every backend capability the dashboard uses.
pub trait AdminBackend:
    EventReader + EventWriter + BookingReader + UserReader + LocationReader + LocationWriter
{
}

impl<T: ?Sized> AdminBackend for T where
    T: EventReader + EventWriter + BookingReader + UserReader + LocationReader + LocationWriter
{
}

/// Toast shown when mounting `tab` fails.
pub fn mount_failure(tab: AdminTab) -> &'static str {
    match tab {
        AdminTab::Events => EVENTS_FETCH_FAILED,
        AdminTab::Past => PAST_EVENTS_FETCH_FAILED,
        AdminTab::Locations => LOCATIONS_FETCH_FAILED,
        AdminTab::Users => USERS_FETCH_FAILED,
    }
}

/// Backend entities addressable by id within a panel.
pub trait Identified {
    type Id: PartialEq;

    fn id(&self) -> &Self::Id;
}

impl Identified for Event {
    type Id = EventId;

    fn id(&self) -> &EventId {
        &self.id
    }
}

impl Identified for Location {
    type Id = LocationId;

    fn id(&self) -> &LocationId {
        &self.id
    }
}

impl Identified for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Loaded collection with optimistic edits.
#[derive(Clone, Debug)]
pub struct ListPanel<T> {
    items: Vec<T>,
    loaded: bool,
}

impl<T> Default for ListPanel<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded: false,
        }
    }
}

impl<T: Identified> ListPanel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, items: Vec<T>) {
        self.items = items;
        self.loaded = true;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    /// Swaps in `item` for the element with the same id.
    pub fn replace(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn find(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }
}

fn empty_draft<F: Default>() -> Draft<F> {
    Draft {
        form: F::default(),
        errors: HashMap::new(),
    }
}

/// Validates `form` against its schema, returning the failed draft if any.
fn check_form<F: FormFields + Clone>(form: &F) -> Result<(), Draft<F>> {
    let mut state = form.state();
    if state.validate_all() {
        Ok(())
    } else {
        Err(Draft {
            form: form.clone(),
            errors: state.errors().clone(),
        })
    }
}

/// Upcoming and past events, plus the create/edit form.
#[derive(Clone, Debug, Default)]
pub struct EventsPanel {
    events: ListPanel<Event>,
    locations: Vec<String>,
    rosters: RosterCache<EventId, Vec<Booking>>,
    booking_counts: HashMap<EventId, usize>,
    pending_delete: Option<PendingDeletion<EventId>>,
    editing: Option<EventId>,
    draft: Option<Draft<EventForm>>,
}

impl EventsPanel {
    pub async fn mount<R>(&mut self, repo: &R) -> ServiceResult<()>
    where
        R: EventReader + LocationReader + ?Sized,
    {
        let events = repo.list_events(&EventQuery::new()).await.map_err(|e| {
            log::error!("Failed to fetch admin events: {e}");
            ServiceError::from(e)
        })?;
        self.events.set(events);
        self.locations = location_names(repo).await;
        self.rosters = RosterCache::new();
        self.booking_counts.clear();
        Ok(())
    }

    /// Fetches the roster size of every past event not counted yet. A failed
    /// fetch counts as zero bookings. Only the size is kept; the roster itself
    /// is loaded when its row is first expanded.
    pub async fn load_booking_counts<R>(&mut self, repo: &R, now: DateTime<Utc>)
    where
        R: BookingReader + ?Sized,
    {
        let missing: Vec<EventId> = self
            .events
            .items()
            .iter()
            .filter(|event| !event.is_upcoming(now) && !self.booking_counts.contains_key(&event.id))
            .map(|event| event.id.clone())
            .collect();

        for id in missing {
            match repo.list_event_bookings(&id).await {
                Ok(bookings) => {
                    self.booking_counts.insert(id, bookings.len());
                }
                Err(e) => {
                    log::warn!("Failed to count bookings for event {id}: {e}");
                    self.booking_counts.insert(id, 0);
                }
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.events.is_loaded()
    }

    pub fn events(&self) -> &[Event] {
        self.events.items()
    }

    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<Event> {
        partition_events(self.events.items().to_vec(), now).0
    }

    pub fn past_rows(&self, now: DateTime<Utc>) -> Vec<PastEventRow> {
        let (_, past) = partition_events(self.events.items().to_vec(), now);
        past.into_iter()
            .map(|event| {
                let expanded = self.rosters.is_expanded(&event.id);
                PastEventRow {
                    bookings_count: self.booking_counts.get(&event.id).copied().unwrap_or(0),
                    bookings: expanded
                        .then(|| self.rosters.get(&event.id).cloned())
                        .flatten(),
                    expanded,
                    event,
                }
            })
            .collect()
    }

    /// Selector entries: known display names followed by "Other".
    pub fn location_options(&self) -> Vec<String> {
        let mut options = self.locations.clone();
        options.push(OTHER_LOCATION.to_string());
        options
    }

    pub fn note_location(&mut self, display_name: &str) {
        if !self.locations.iter().any(|l| l == display_name) {
            self.locations.push(display_name.to_string());
        }
    }

    pub fn forget_location(&mut self, display_name: &str) {
        self.locations.retain(|l| l != display_name);
    }

    pub fn editing(&self) -> Option<&EventId> {
        self.editing.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&PendingDeletion<EventId>> {
        self.pending_delete.as_ref()
    }

    /// Form to render: the failed or in-progress draft, else a blank one.
    pub fn draft(&self) -> Draft<EventForm> {
        self.draft.clone().unwrap_or_else(empty_draft)
    }

    /// Creates the event, or updates the one being edited, and applies the
    /// result to the list. Returns the success message.
    pub async fn save<R>(&mut self, repo: &R, form: EventForm) -> ServiceResult<&'static str>
    where
        R: EventWriter + ?Sized,
    {
        if let Err(draft) = check_form(&form) {
            self.draft = Some(draft);
            return Err(ServiceError::Form(FIX_FIELDS.to_string()));
        }

        let payload = match EventPayload::try_from(form.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                self.draft = Some(Draft {
                    form,
                    errors: HashMap::new(),
                });
                return Err(e.into());
            }
        };

        let result = match self.editing.clone() {
            Some(id) => repo
                .update_event(&id, &payload)
                .await
                .map(|event| {
                    if !self.events.replace(event.clone()) {
                        self.events.append(event);
                    }
                    EVENT_UPDATED
                }),
            None => repo.create_event(&payload).await.map(|event| {
                self.events.append(event);
                EVENT_CREATED
            }),
        };

        match result {
            Ok(message) => {
                log::info!("{message}: {}", payload.title);
                self.cancel_edit();
                Ok(message)
            }
            Err(e) => {
                log::error!("Failed to save event {}: {e}", payload.title);
                self.draft = Some(Draft {
                    form,
                    errors: HashMap::new(),
                });
                Err(e.into())
            }
        }
    }

    /// Prefills the form with the event for editing.
    pub fn start_edit(&mut self, id: &EventId) -> ServiceResult<()> {
        let event = self.events.find(id).ok_or(ServiceError::NotFound)?;
        self.draft = Some(Draft {
            form: EventForm::from_event(event, &self.locations),
            errors: HashMap::new(),
        });
        self.editing = Some(id.clone());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft = None;
    }

    /// Opens the confirmation dialog for deleting `id`.
    pub fn request_delete(&mut self, id: &EventId) -> ServiceResult<()> {
        let event = self.events.find(id).ok_or(ServiceError::NotFound)?;
        self.pending_delete = Some(PendingDeletion {
            id: id.clone(),
            label: event.title.clone(),
        });
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes `id` if, and only if, its deletion is pending confirmation.
    /// Returns whether a DELETE was issued.
    pub async fn confirm_delete<R>(&mut self, repo: &R, id: &EventId) -> ServiceResult<bool>
    where
        R: EventWriter + ?Sized,
    {
        if self.pending_delete.as_ref().map(|pending| &pending.id) != Some(id) {
            return Ok(false);
        }
        self.pending_delete = None;

        repo.delete_event(id).await.map_err(|e| {
            log::error!("Failed to delete event {id}: {e}");
            ServiceError::from(e)
        })?;

        self.events.remove(id);
        self.rosters.invalidate(id);
        self.booking_counts.remove(id);
        if self.editing.as_ref() == Some(id) {
            self.cancel_edit();
        }
        Ok(true)
    }

    /// Expands or collapses a past event's booking roster.
    pub async fn toggle_roster<R>(&mut self, repo: &R, id: EventId) -> ServiceResult<()>
    where
        R: BookingReader + ?Sized,
    {
        let key = id.clone();
        self.rosters
            .toggle(id, |id| async move { repo.list_event_bookings(&id).await })
            .await
            .map_err(|e| {
                log::error!("Failed to fetch bookings for event {key}: {e}");
                ServiceError::from(e)
            })?;

        if let Some(bookings) = self.rosters.get(&key) {
            self.booking_counts.insert(key, bookings.len());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct LocationsPanel {
    locations: ListPanel<Location>,
    pending_delete: Option<PendingDeletion<LocationId>>,
    draft: Option<Draft<LocationForm>>,
}

impl LocationsPanel {
    pub async fn mount<R>(&mut self, repo: &R) -> ServiceResult<()>
    where
        R: LocationReader + ?Sized,
    {
        let locations = repo.list_locations().await.map_err(|e| {
            log::error!("Failed to fetch locations: {e}");
            ServiceError::from(e)
        })?;
        self.locations.set(locations);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.locations.is_loaded()
    }

    pub fn items(&self) -> &[Location] {
        self.locations.items()
    }

    pub fn draft(&self) -> Draft<LocationForm> {
        self.draft.clone().unwrap_or_else(empty_draft)
    }

    pub fn pending_delete(&self) -> Option<&PendingDeletion<LocationId>> {
        self.pending_delete.as_ref()
    }

    /// Creates the location (name slugified) and appends it.
    pub async fn add<R>(&mut self, repo: &R, form: LocationForm) -> ServiceResult<Location>
    where
        R: LocationWriter + ?Sized,
    {
        if let Err(draft) = check_form(&form) {
            self.draft = Some(draft);
            return Err(ServiceError::Form(LOCATION_FIELDS_REQUIRED.to_string()));
        }

        let location = NewLocation::try_from(form.clone()).map_err(|e| {
            self.draft = Some(Draft {
                form: form.clone(),
                errors: HashMap::new(),
            });
            ServiceError::from(e)
        })?;

        match repo.create_location(&location).await {
            Ok(created) => {
                log::info!("Created location {}", created.name);
                self.locations.append(created.clone());
                self.draft = None;
                Ok(created)
            }
            Err(e) => {
                log::error!("Failed to add location {}: {e}", location.name.as_str());
                self.draft = Some(Draft {
                    form,
                    errors: HashMap::new(),
                });
                Err(e.into())
            }
        }
    }

    pub fn request_delete(&mut self, id: &LocationId) -> ServiceResult<()> {
        let location = self.locations.find(id).ok_or(ServiceError::NotFound)?;
        self.pending_delete = Some(PendingDeletion {
            id: id.clone(),
            label: location.display_name.clone(),
        });
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes a location whose deletion is pending; returns the removed entry.
    pub async fn confirm_delete<R>(
        &mut self,
        repo: &R,
        id: &LocationId,
    ) -> ServiceResult<Option<Location>>
    where
        R: LocationWriter + ?Sized,
    {
        if self.pending_delete.as_ref().map(|pending| &pending.id) != Some(id) {
            return Ok(None);
        }
        self.pending_delete = None;

        repo.delete_location(id).await.map_err(|e| {
            log::error!("Failed to delete location {id}: {e}");
            ServiceError::from(e)
        })?;
        Ok(self.locations.remove(id))
    }
}

#[derive(Clone, Debug, Default)]
pub struct UsersPanel {
    users: ListPanel<User>,
    bookings: RosterCache<UserId, Vec<Booking>>,
}

impl UsersPanel {
    pub async fn mount<R>(&mut self, repo: &R) -> ServiceResult<()>
    where
        R: UserReader + ?Sized,
    {
        let users = repo.list_users().await.map_err(|e| {
            log::error!("Failed to load users: {e}");
            ServiceError::from(e)
        })?;
        self.users.set(users);
        self.bookings = RosterCache::new();
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.users.is_loaded()
    }

    pub fn rows(&self) -> Vec<UserRow> {
        self.users
            .items()
            .iter()
            .map(|user| UserRow {
                mobile: user
                    .mobile
                    .clone()
                    .filter(|mobile| !mobile.trim().is_empty())
                    .unwrap_or_else(|| NO_MOBILE.to_string()),
                user: user.clone(),
            })
            .collect()
    }

    /// Opens the bookings of `id`, or closes them if already open.
    pub async fn view_bookings<R>(&mut self, repo: &R, id: UserId) -> ServiceResult<()>
    where
        R: BookingReader + ?Sized,
    {
        if self.users.find(&id).is_none() {
            return Err(ServiceError::NotFound);
        }
        let key = id.clone();
        self.bookings
            .toggle(id, |id| async move { repo.list_user_bookings(&id).await })
            .await
            .map_err(|e| {
                log::error!("Failed to fetch bookings of user {key}: {e}");
                ServiceError::from(e)
            })?;
        Ok(())
    }

    pub fn selected(&self) -> Option<UserBookings> {
        let id = self.bookings.expanded()?;
        Some(UserBookings {
            user: self.users.find(id)?.clone(),
            bookings: self.bookings.get(id).cloned().unwrap_or_default(),
        })
    }
}

/// Panel state of one signed-in admin.
#[derive(Clone, Debug, Default)]
pub struct AdminWorkspace {
    scope: ViewScope,
    mounted: Option<AdminTab>,
    pub events: EventsPanel,
    pub locations: LocationsPanel,
    pub users: UsersPanel,
}

impl AdminWorkspace {
    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    fn is_tab_loaded(&self, tab: AdminTab) -> bool {
        match tab {
            AdminTab::Events | AdminTab::Past => self.events.is_loaded(),
            AdminTab::Locations => self.locations.is_loaded(),
            AdminTab::Users => self.users.is_loaded(),
        }
    }

    /// Fetches the data behind `tab` when switching to it, when it was never
    /// loaded, or when `refresh` is set. Calls are bound to the workspace
    /// scope; after the workspace is closed they resolve to nothing.
    pub async fn open_tab<R>(
        &mut self,
        repo: &R,
        tab: AdminTab,
        refresh: bool,
        now: DateTime<Utc>,
    ) -> ServiceResult<()>
    where
        R: AdminBackend + ?Sized,
    {
        if !refresh && self.mounted == Some(tab) && self.is_tab_loaded(tab) {
            return Ok(());
        }

        let scope = self.scope.clone();
        let mounted = match tab {
            AdminTab::Events => scope.run(self.events.mount(repo)).await,
            AdminTab::Past => {
                scope
                    .run(async {
                        self.events.mount(repo).await?;
                        self.events.load_booking_counts(repo, now).await;
                        Ok::<(), ServiceError>(())
                    })
                    .await
            }
            AdminTab::Locations => scope.run(self.locations.mount(repo)).await,
            AdminTab::Users => scope.run(self.users.mount(repo)).await,
        };

        match mounted {
            Some(result) => {
                result?;
                self.mounted = Some(tab);
            }
            None => log::debug!("Workspace closed while mounting the {tab:?} tab"),
        }
        Ok(())
    }

    pub fn dashboard(&self, tab: AdminTab, now: DateTime<Utc>) -> DashboardData {
        DashboardData {
            tab,
            upcoming: self.events.upcoming(now),
            past: self.events.past_rows(now),
            location_options: self.events.location_options(),
            event_form: self.events.draft(),
            editing: self.events.editing().cloned(),
            pending_event_delete: self.events.pending_delete().cloned(),
            locations: self.locations.items().to_vec(),
            location_form: self.locations.draft(),
            pending_location_delete: self.locations.pending_delete().cloned(),
            users: self.users.rows(),
            user_bookings: self.users.selected(),
        }
    }
}

/// Workspaces untouched for this long are dropped on the next checkout.
pub const ADMIN_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug)]
struct Slot {
    workspace: AdminWorkspace,
    last_seen: Instant,
}

/// Workspaces of all signed-in admins, keyed by admin token.
///
/// Handlers check a workspace out, work on the copy and commit it back. A
/// commit after [`AdminWorkspaces::close`] is discarded. Sessions that simply
/// lapse are pruned once idle for longer than the configured timeout.
#[derive(Debug)]
pub struct AdminWorkspaces {
    inner: Mutex<HashMap<String, Slot>>,
    idle_timeout: Duration,
}

impl Default for AdminWorkspaces {
    fn default() -> Self {
        Self::with_idle_timeout(ADMIN_IDLE_TIMEOUT)
    }
}

impl AdminWorkspaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn checkout(&self, token: &str) -> AdminWorkspace {
        let now = Instant::now();
        let mut slots = self.lock();

        slots.retain(|key, slot| {
            let live = key == token || now.duration_since(slot.last_seen) < self.idle_timeout;
            if !live {
                slot.workspace.scope.cancel();
            }
            live
        });

        let slot = slots.entry(token.to_string()).or_insert_with(|| Slot {
            workspace: AdminWorkspace::default(),
            last_seen: now,
        });
        slot.last_seen = now;
        slot.workspace.clone()
    }

    pub fn commit(&self, token: &str, workspace: AdminWorkspace) {
        if workspace.scope.is_cancelled() {
            return;
        }
        if let Some(slot) = self.lock().get_mut(token) {
            slot.workspace = workspace;
            slot.last_seen = Instant::now();
        }
    }

    /// Drops the workspace and cancels its pending calls.
    pub fn close(&self, token: &str) {
        if let Some(slot) = self.lock().remove(token) {
            slot.workspace.scope.cancel();
            log::info!("Closed admin workspace");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::api::errors::ApiError;
    use crate::api::fixtures;
    use crate::api::mock::MockBackend;

    fn event_form() -> EventForm {
        EventForm {
            title: "Jazz Night".to_string(),
            description: "Smooth".to_string(),
            location: "Pune".to_string(),
            custom_location: String::new(),
            date: "2030-03-01T19:30".to_string(),
            total_seats: "100".to_string(),
            price: "750".to_string(),
            img: "https://cdn.example.com/jazz.png".to_string(),
        }
    }

    fn id(value: &str) -> EventId {
        EventId::new(value).unwrap()
    }

    fn loaded_panel(now: DateTime<Utc>) -> EventsPanel {
        let mut panel = EventsPanel::default();
        panel.events.set(vec![
            fixtures::event("old", now - Duration::days(2)),
            fixtures::event("new", now + Duration::days(2)),
        ]);
        panel.locations = vec!["Pune".to_string()];
        panel
    }

    #[test]
    fn list_panel_edits_by_id() {
        let now = Utc::now();
        let mut panel = ListPanel::new();
        panel.set(vec![fixtures::event("a", now)]);

        let mut renamed = fixtures::event("a", now);
        renamed.title = "Renamed".to_string();
        assert!(panel.replace(renamed));
        assert!(!panel.replace(fixtures::event("zz", now)));
        panel.append(fixtures::event("b", now));

        assert_eq!(panel.items()[0].title, "Renamed");
        assert_eq!(panel.remove(&id("a")).map(|e| e.title), Some("Renamed".to_string()));
        assert_eq!(panel.items().len(), 1);
    }

    #[actix_web::test]
    async fn mount_partitions_and_offers_other() {
        let now = Utc::now();
        let mut backend = MockBackend::new();
        backend.expect_list_events().times(1).returning(move |_| {
            Ok(vec![
                fixtures::event("old", now - Duration::days(2)),
                fixtures::event("new", now + Duration::days(2)),
            ])
        });
        backend
            .expect_list_locations()
            .times(1)
            .returning(|| Ok(vec![fixtures::location("l1", "Pune")]));

        let mut panel = EventsPanel::default();
        panel.mount(&backend).await.unwrap();

        assert_eq!(panel.upcoming(now).len(), 1);
        assert_eq!(panel.past_rows(now)[0].event.id, id("old"));
        assert_eq!(panel.location_options(), vec!["Pune", OTHER_LOCATION]);
    }

    #[actix_web::test]
    async fn create_appends_and_clears_form() {
        let now = Utc::now();
        let mut backend = MockBackend::new();
        backend
            .expect_create_event()
            .withf(|payload| payload.available_seats == 100)
            .times(1)
            .returning(move |_| Ok(fixtures::event("created", now + Duration::days(30))));

        let mut panel = loaded_panel(now);
        let message = panel.save(&backend, event_form()).await.unwrap();

        assert_eq!(message, EVENT_CREATED);
        assert_eq!(panel.upcoming(now).len(), 2);
        assert!(panel.draft().form.title.is_empty());
    }

    #[actix_web::test]
    async fn update_replaces_edited_event() {
        let now = Utc::now();
        let mut backend = MockBackend::new();
        backend
            .expect_update_event()
            .withf(|id, _| id.as_str() == "new")
            .times(1)
            .returning(move |_, _| {
                let mut event = fixtures::event("new", now + Duration::days(2));
                event.title = "Jazz Night".to_string();
                Ok(event)
            });

        let mut panel = loaded_panel(now);
        panel.start_edit(&id("new")).unwrap();
        assert_eq!(panel.draft().form.location, "Pune");

        let message = panel.save(&backend, event_form()).await.unwrap();

        assert_eq!(message, EVENT_UPDATED);
        assert_eq!(panel.events().len(), 2);
        assert_eq!(panel.upcoming(now)[0].title, "Jazz Night");
        assert_eq!(panel.editing(), None);
    }

    #[actix_web::test]
    async fn invalid_event_form_keeps_draft_without_request() {
        let mut backend = MockBackend::new();
        backend.expect_create_event().times(0);

        let mut panel = EventsPanel::default();
        let form = EventForm {
            title: String::new(),
            ..event_form()
        };
        let result = panel.save(&backend, form).await;

        assert!(matches!(result, Err(ServiceError::Form(_))));
        assert!(panel.draft().errors.contains_key("title"));
    }

    #[actix_web::test]
    async fn delete_requires_confirmation() {
        let now = Utc::now();
        let mut backend = MockBackend::new();
        backend
            .expect_delete_event()
            .withf(|id| id.as_str() == "new")
            .times(1)
            .returning(|_| Ok(()));

        let mut panel = loaded_panel(now);
        assert!(!panel.confirm_delete(&backend, &id("new")).await.unwrap());

        panel.request_delete(&id("new")).unwrap();
        assert_eq!(panel.pending_delete().map(|p| p.label.as_str()), Some("Event new"));
        assert!(panel.confirm_delete(&backend, &id("new")).await.unwrap());

        assert_eq!(panel.events().len(), 1);
        assert_eq!(panel.pending_delete(), None);
    }

    #[actix_web::test]
    async fn cancelled_delete_issues_nothing() {
        let mut backend = MockBackend::new();
        backend.expect_delete_event().times(0);

        let mut panel = loaded_panel(Utc::now());
        panel.request_delete(&id("old")).unwrap();
        panel.cancel_delete();

        assert!(!panel.confirm_delete(&backend, &id("old")).await.unwrap());
    }

    #[actix_web::test]
    async fn roster_loads_once_and_counts() {
        let now = Utc::now();
        let mut backend = MockBackend::new();
        backend
            .expect_list_event_bookings()
            .times(1)
            .returning(|_| Ok(vec![fixtures::booking("b1", "old", 2)]));

        let mut panel = loaded_panel(now);
        panel.toggle_roster(&backend, id("old")).await.unwrap();
        let row = &panel.past_rows(now)[0];
        assert!(row.expanded);
        assert_eq!(row.bookings_count, 1);

        panel.toggle_roster(&backend, id("old")).await.unwrap();
        panel.toggle_roster(&backend, id("old")).await.unwrap();
        assert!(panel.past_rows(now)[0].bookings.is_some());
    }

    #[actix_web::test]
    async fn counted_roster_is_fetched_on_first_expand() {
        let now = Utc::now();
        let mut backend = MockBackend::new();
        backend
            .expect_list_event_bookings()
            .times(2)
            .returning(|_| Ok(vec![fixtures::booking("b1", "old", 2)]));

        let mut panel = loaded_panel(now);
        panel.load_booking_counts(&backend, now).await;
        let row = &panel.past_rows(now)[0];
        assert_eq!(row.bookings_count, 1);
        assert!(row.bookings.is_none());

        panel.toggle_roster(&backend, id("old")).await.unwrap();
        panel.toggle_roster(&backend, id("old")).await.unwrap();
        panel.toggle_roster(&backend, id("old")).await.unwrap();

        let row = &panel.past_rows(now)[0];
        assert!(row.expanded);
        assert_eq!(row.bookings.as_ref().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn failed_counts_show_zero() {
        let now = Utc::now();
        let mut backend = MockBackend::new();
        backend
            .expect_list_event_bookings()
            .times(1)
            .returning(|_| Err(ApiError::NotFound(String::new())));

        let mut panel = loaded_panel(now);
        panel.load_booking_counts(&backend, now).await;

        let rows = panel.past_rows(now);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bookings_count, 0);
        assert!(!rows[0].expanded);
    }

    #[actix_web::test]
    async fn location_add_requires_both_fields() {
        let mut backend = MockBackend::new();
        backend.expect_create_location().times(0);

        let mut panel = LocationsPanel::default();
        let result = panel
            .add(
                &backend,
                LocationForm {
                    name: "pune".to_string(),
                    display_name: String::new(),
                },
            )
            .await;

        assert_eq!(
            result.unwrap_err().user_message(LOCATION_ADD_FAILED),
            LOCATION_FIELDS_REQUIRED
        );
    }

    #[actix_web::test]
    async fn location_add_and_confirmed_delete() {
        let mut backend = MockBackend::new();
        backend
            .expect_create_location()
            .withf(|location| location.name.as_str() == "new-york")
            .times(1)
            .returning(|_| Ok(fixtures::location("l2", "New York")));
        backend
            .expect_delete_location()
            .times(1)
            .returning(|_| Ok(()));

        let mut panel = LocationsPanel::default();
        let form = LocationForm {
            name: "New York".to_string(),
            display_name: "New York".to_string(),
        };
        let created = panel.add(&backend, form).await.unwrap();
        assert_eq!(panel.items().len(), 1);

        panel.request_delete(&created.id).unwrap();
        let removed = panel.confirm_delete(&backend, &created.id).await.unwrap();

        assert_eq!(removed.map(|l| l.display_name), Some("New York".to_string()));
        assert!(panel.items().is_empty());
    }

    #[actix_web::test]
    async fn user_rows_and_bookings_modal() {
        let mut backend = MockBackend::new();
        backend.expect_list_users().times(1).returning(|| {
            Ok(vec![
                fixtures::user("u1", Some("9876543210")),
                fixtures::user("u2", None),
            ])
        });
        backend
            .expect_list_user_bookings()
            .withf(|id| id.as_str() == "u1")
            .times(1)
            .returning(|_| Ok(vec![fixtures::booking("b1", "ev1", 1)]));

        let mut panel = UsersPanel::default();
        panel.mount(&backend).await.unwrap();
        let rows = panel.rows();
        assert_eq!(rows[0].mobile, "9876543210");
        assert_eq!(rows[1].mobile, "--");

        let user = UserId::new("u1").unwrap();
        panel.view_bookings(&backend, user.clone()).await.unwrap();
        assert_eq!(panel.selected().map(|s| s.bookings.len()), Some(1));

        panel.view_bookings(&backend, user).await.unwrap();
        assert!(panel.selected().is_none());
    }

    #[actix_web::test]
    async fn tab_is_mounted_once_until_refresh() {
        let now = Utc::now();
        let mut backend = MockBackend::new();
        backend
            .expect_list_locations()
            .times(2)
            .returning(|| Ok(vec![fixtures::location("l1", "Pune")]));

        let mut workspace = AdminWorkspace::default();
        workspace
            .open_tab(&backend, AdminTab::Locations, false, now)
            .await
            .unwrap();
        workspace
            .open_tab(&backend, AdminTab::Locations, false, now)
            .await
            .unwrap();
        workspace
            .open_tab(&backend, AdminTab::Locations, true, now)
            .await
            .unwrap();

        assert_eq!(workspace.dashboard(AdminTab::Locations, now).locations.len(), 1);
    }

    #[actix_web::test]
    async fn expired_token_surfaces_as_unauthorized() {
        let mut backend = MockBackend::new();
        backend.expect_list_users().times(1).returning(|| {
            Err(ApiError::Backend {
                status: 401,
                message: "jwt expired".to_string(),
            })
        });

        let mut workspace = AdminWorkspace::default();
        let result = workspace
            .open_tab(&backend, AdminTab::Users, false, Utc::now())
            .await;

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn commit_after_close_is_dropped() {
        let workspaces = AdminWorkspaces::new();
        let mut workspace = workspaces.checkout("t");
        workspace.events.note_location("Goa");

        workspaces.close("t");
        workspaces.commit("t", workspace);

        assert!(workspaces.is_empty());
    }

    #[test]
    fn committed_state_survives_checkout() {
        let workspaces = AdminWorkspaces::new();
        let mut workspace = workspaces.checkout("t");
        workspace.events.note_location("Goa");
        workspaces.commit("t", workspace);

        let again = workspaces.checkout("t");
        assert_eq!(again.events.location_options(), vec!["Goa", OTHER_LOCATION]);
        assert_eq!(workspaces.len(), 1);
    }

    #[test]
    fn idle_workspaces_are_pruned_on_checkout() {
        let workspaces = AdminWorkspaces::with_idle_timeout(std::time::Duration::ZERO);
        let stale = workspaces.checkout("stale");
        assert_eq!(workspaces.len(), 1);

        let current = workspaces.checkout("current");

        assert_eq!(workspaces.len(), 1);
        assert!(stale.scope().is_cancelled());
        assert!(!current.scope().is_cancelled());
    }
}
