//! Platform content state.

use crate::framework::StoreState;
use crate::gateway::Session;
use crate::model::{Lecturer, LecturerId, Note, Tag, Unit, UnitId, Year, YearId};
use crate::store::{store_slots, track_failure, Collection, CollectionEvent};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ContentState {
    pub years: Collection<Year>,
    pub units: Collection<Unit>,
    pub lecturers: Collection<Lecturer>,
    /// Published notes, newest first.
    pub notes: Collection<Note>,
    pub tags: Collection<Tag>,
    pub search_results: Arc<Vec<Note>>,
    pub is_searching: bool,
    /// Latest failure message from any collection.
    pub error: Option<String>,
    /// Table whose fetch set `error`.
    pub error_source: Option<&'static str>,
    pub current_user: Option<Session>,
}

#[derive(Debug)]
pub enum ContentCommand {
    Years(CollectionEvent<Year>),
    Units(CollectionEvent<Unit>),
    Lecturers(CollectionEvent<Lecturer>),
    Notes(CollectionEvent<Note>),
    Tags(CollectionEvent<Tag>),
    SetSearching(bool),
    SetSearchResults(Arc<Vec<Note>>),
    SetCurrentUser(Option<Session>),
    ClearError,
}

store_slots!(ContentState {
    Year => years as ContentCommand::Years,
    Unit => units as ContentCommand::Units,
    Lecturer => lecturers as ContentCommand::Lecturers,
    Note => notes as ContentCommand::Notes,
    Tag => tags as ContentCommand::Tags,
});

impl StoreState for ContentState {
    type Command = ContentCommand;

    fn reduce(&self, command: ContentCommand) -> Self {
        let mut next = self.clone();
        match command {
            ContentCommand::Years(event) => {
                track_failure(&mut next.error, &mut next.error_source, &event);
                next.years = self.years.apply(event);
            }
            ContentCommand::Units(event) => {
                track_failure(&mut next.error, &mut next.error_source, &event);
                next.units = self.units.apply(event);
            }
            ContentCommand::Lecturers(event) => {
                track_failure(&mut next.error, &mut next.error_source, &event);
                next.lecturers = self.lecturers.apply(event);
            }
            ContentCommand::Notes(event) => {
                track_failure(&mut next.error, &mut next.error_source, &event);
                next.notes = self.notes.apply(event);
            }
            ContentCommand::Tags(event) => {
                track_failure(&mut next.error, &mut next.error_source, &event);
                next.tags = self.tags.apply(event);
            }
            ContentCommand::SetSearching(searching) => next.is_searching = searching,
            ContentCommand::SetSearchResults(results) => next.search_results = results,
            ContentCommand::SetCurrentUser(session) => next.current_user = session,
            ContentCommand::ClearError => {
                next.error = None;
                next.error_source = None;
            }
        }
        next
    }

    fn label(command: &ContentCommand) -> &'static str {
        match command {
            ContentCommand::Years(_) => "Years",
            ContentCommand::Units(_) => "Units",
            ContentCommand::Lecturers(_) => "Lecturers",
            ContentCommand::Notes(_) => "Notes",
            ContentCommand::Tags(_) => "Tags",
            ContentCommand::SetSearching(_) => "SetSearching",
            ContentCommand::SetSearchResults(_) => "SetSearchResults",
            ContentCommand::SetCurrentUser(_) => "SetCurrentUser",
            ContentCommand::ClearError => "ClearError",
        }
    }
}

impl ContentState {
    /// True while any collection is being fetched.
    pub fn loading(&self) -> bool {
        self.years.is_loading()
            || self.units.is_loading()
            || self.lecturers.is_loading()
            || self.notes.is_loading()
            || self.tags.is_loading()
    }

    pub fn featured_notes(&self) -> Vec<&Note> {
        self.notes.iter().filter(|note| note.is_featured).collect()
    }

    pub fn notes_for_unit(&self, unit_id: &UnitId) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|note| &note.unit_id == unit_id)
            .collect()
    }

    pub fn units_for_year(&self, year_id: &YearId) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|unit| &unit.year_id == year_id)
            .collect()
    }

    pub fn active_lecturers(&self) -> Vec<&Lecturer> {
        self.lecturers.iter().filter(|l| l.is_active).collect()
    }

    // Relations may reference rows whose collection has not loaded yet.
    pub fn year(&self, id: &YearId) -> Option<&Year> {
        self.years.get(id)
    }

    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn lecturer(&self, id: &LecturerId) -> Option<&Lecturer> {
        self.lecturers.get(id)
    }
}
