//! SeatingEngine - the editing session facade
//!
//! Owns the plan for one editing session and exposes the queries and
//! commands a host UI binds to. Every mutating command runs through
//! [`SeatingEngine::commit_plan`]:
//!
//! ```text
//! command(args)
//!     ├─ 1. Snapshot the plan (pre-state)
//!     ├─ 2. Apply the edit; on Err restore the snapshot and return
//!     ├─ 3. Snap moved tables to the grid (when enabled)
//!     ├─ 4. Unchanged plan → return without a history entry
//!     ├─ 5. Push the pre-state onto history, mark the area dirty
//!     ├─ 6. Drop selected ids that no longer exist
//!     ├─ 7. Recompute the layout analysis of every area
//!     └─ 8. Publish PlanChanged / HistoryChanged / AnalysisUpdated
//! ```
//!
//! Only the remote assignment request suspends; everything else is
//! synchronous.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use shared::Point;
use shared::models::{
    Annotation, AnnotationId, Area, AreaKind, AssignmentProposal, Guest, GuestId, PlanSnapshot,
    TableCreate, TableId, TableShape,
};
use tokio::sync::broadcast;

use crate::analyzer::{LayoutAnalysis, analyze};
use crate::assignment::{
    RemoteStatus, RemoteTicket, RemoteTracker, TableSuggestion, apply_proposal, eligible_guests,
    local_assignment, normalize_response, suggest_tables,
};
use crate::core::{
    ChangeReason, EngineConfig, EngineError, EngineEvent, EngineResult, EventBus, SolverError,
    StoreError,
};
use crate::draw_mode::{DrawController, DrawEffect, DrawMode, PointerEvent};
use crate::geometry::snap_to_grid;
use crate::history::History;
use crate::history_log;
use crate::plan::{self, BanquetLayout};
use crate::selection::{EntityRef, Selection};
use crate::solver::{AssignmentSolver, SolverResponse};
use crate::store::{GuestDirectory, SnapshotStore};
use crate::transform::{
    self, AlignDirection, DistributeDirection, MIN_ALIGN, MIN_DISTRIBUTE,
};

pub struct SeatingEngine {
    config: EngineConfig,
    wedding_id: Option<String>,
    plan: PlanSnapshot,
    active_area: AreaKind,
    selection: Selection,
    history: History<PlanSnapshot>,
    draw: DrawController,
    guests: Vec<Guest>,
    latest_proposal: Option<AssignmentProposal>,
    remote: RemoteTracker,
    /// Areas changed since the last successful save
    dirty: BTreeSet<AreaKind>,
    analysis: BTreeMap<AreaKind, LayoutAnalysis>,
    events: EventBus,
}

impl std::fmt::Debug for SeatingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatingEngine")
            .field("wedding_id", &self.wedding_id)
            .field("active_area", &self.active_area)
            .field("selected", &self.selection.len())
            .field("history", &self.history.len())
            .field("dirty", &self.dirty)
            .field("events", &"<broadcast::Sender>")
            .finish()
    }
}

impl SeatingEngine {
    /// Engine over an empty plan sized by `config`
    pub fn new(config: EngineConfig) -> Self {
        let plan = PlanSnapshot {
            areas: AreaKind::ALL
                .iter()
                .map(|kind| (*kind, Self::empty_area(&config, *kind)))
                .collect(),
        };
        let mut engine = Self {
            history: History::new(config.history_limit),
            config,
            wedding_id: None,
            plan,
            active_area: AreaKind::Banquet,
            selection: Selection::new(),
            draw: DrawController::new(),
            guests: Vec::new(),
            latest_proposal: None,
            remote: RemoteTracker::default(),
            dirty: BTreeSet::new(),
            analysis: BTreeMap::new(),
            events: EventBus::new(),
        };
        for kind in AreaKind::ALL {
            engine.refresh_analysis(kind);
        }
        engine
    }

    pub fn with_wedding_id(mut self, wedding_id: impl Into<String>) -> Self {
        self.wedding_id = Some(wedding_id.into());
        self
    }

    fn empty_area(config: &EngineConfig, kind: AreaKind) -> Area {
        let mut area = Area::with_size(kind, config.venue_width, config.venue_height);
        area.aisle_min = config.aisle_min;
        area
    }

    // ========== Queries ==========

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn wedding_id(&self) -> Option<&str> {
        self.wedding_id.as_deref()
    }

    pub fn plan(&self) -> &PlanSnapshot {
        &self.plan
    }

    pub fn area(&self, kind: AreaKind) -> Option<&Area> {
        self.plan.area(kind)
    }

    pub fn active_area(&self) -> AreaKind {
        self.active_area
    }

    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    pub fn selected_ids(&self) -> &[EntityRef] {
        self.selection.selected_ids()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn current_draw_mode(&self) -> DrawMode {
        self.draw.mode()
    }

    pub fn draw_controller(&self) -> &DrawController {
        &self.draw
    }

    pub fn latest_proposal(&self) -> Option<&AssignmentProposal> {
        self.latest_proposal.as_ref()
    }

    /// Analysis of the active area
    pub fn latest_analysis(&self) -> Option<&LayoutAnalysis> {
        self.analysis.get(&self.active_area)
    }

    pub fn analysis(&self, kind: AreaKind) -> Option<&LayoutAnalysis> {
        self.analysis.get(&kind)
    }

    pub fn remote_status(&self) -> &RemoteStatus {
        self.remote.status()
    }

    pub fn dirty_areas(&self) -> impl Iterator<Item = AreaKind> + '_ {
        self.dirty.iter().copied()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    fn area_ref(&self, kind: AreaKind) -> EngineResult<&Area> {
        self.plan
            .area(kind)
            .ok_or(EngineError::AreaMissing { expected: kind })
    }

    // ========== Commit pipeline ==========

    /// Run `edit` on the active area as one undoable command
    fn commit<T>(
        &mut self,
        reason: ChangeReason,
        label: &str,
        edit: impl FnOnce(&mut Area) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let kind = self.active_area;
        self.commit_plan(kind, reason, label, |plan| {
            let area = plan
                .areas
                .get_mut(&kind)
                .ok_or(EngineError::AreaMissing { expected: kind })?;
            edit(area)
        })
    }

    fn commit_plan<T>(
        &mut self,
        kind: AreaKind,
        reason: ChangeReason,
        label: &str,
        edit: impl FnOnce(&mut PlanSnapshot) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let before = self.plan.clone();
        let value = match edit(&mut self.plan) {
            Ok(value) => value,
            Err(e) => {
                self.plan = before;
                tracing::warn!(area = %kind, command = label, error = %e, "Command rejected");
                return Err(e);
            }
        };

        if self.config.snap_to_grid {
            self.snap_moved_tables(kind, &before);
        }
        if self.plan == before {
            tracing::debug!(area = %kind, command = label, "Command changed nothing");
            return Ok(value);
        }

        self.history.push(before, label);
        history_log!("commit", kind, label);
        tracing::info!(area = %kind, command = label, "Plan committed");
        self.after_change(kind, reason);
        Ok(value)
    }

    /// Snap tables whose position differs from `before`
    fn snap_moved_tables(&mut self, kind: AreaKind, before: &PlanSnapshot) {
        let step = self.config.grid_step;
        let old = before.area(kind);
        let Some(area) = self.plan.areas.get_mut(&kind) else {
            return;
        };
        for table in &mut area.tables {
            let moved = old
                .and_then(|a| a.table(table.id))
                .is_none_or(|t| t.position != table.position);
            if moved {
                table.position = snap_to_grid(table.position, step);
            }
        }
    }

    fn after_change(&mut self, kind: AreaKind, reason: ChangeReason) {
        self.dirty.insert(kind);
        if kind == self.active_area {
            let pruned = match self.plan.area(kind) {
                Some(area) => self.selection.retain_existing(area),
                None => false,
            };
            if pruned {
                self.publish_selection();
            }
        }
        self.events.publish(EngineEvent::PlanChanged { area: kind, reason });
        self.publish_history();
        // seating in one area changes who is pending in the other
        for kind in AreaKind::ALL {
            self.refresh_analysis(kind);
        }
    }

    fn refresh_analysis(&mut self, kind: AreaKind) {
        let Some(area) = self.plan.area(kind) else {
            return;
        };
        let guests = eligible_guests(&self.plan, kind, &self.guests);
        let result = analyze(area, &guests);
        self.events.publish(EngineEvent::AnalysisUpdated {
            area: kind,
            score: result.score,
            rating: result.rating.as_str().to_string(),
        });
        self.analysis.insert(kind, result);
    }

    fn publish_history(&self) {
        self.events.publish(EngineEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn publish_selection(&self) {
        self.events.publish(EngineEvent::SelectionChanged {
            count: self.selection.len(),
        });
    }

    // ========== Undo / redo ==========

    /// Step back one command; `false` at the start of history
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.plan.clone()) {
            Some(previous) => {
                self.restore(previous, ChangeReason::Undo);
                true
            }
            None => false,
        }
    }

    /// Step forward one command; `false` at the tip
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(next) => {
                self.restore(next, ChangeReason::Redo);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: PlanSnapshot, reason: ChangeReason) {
        let changed: Vec<AreaKind> = AreaKind::ALL
            .into_iter()
            .filter(|kind| self.plan.area(*kind) != snapshot.area(*kind))
            .collect();
        self.plan = snapshot;
        history_log!(
            if reason == ChangeReason::Undo { "undo" } else { "redo" },
            self.active_area
        );
        for kind in &changed {
            self.after_change(*kind, reason);
        }
        if changed.is_empty() {
            self.publish_history();
        }
    }

    // ========== Selection ==========

    pub fn start_marquee(&mut self, p: Point) {
        self.selection.start_marquee(p);
    }

    pub fn update_marquee(&mut self, p: Point) -> bool {
        self.selection.update_marquee(p)
    }

    /// Finish the marquee over the active area; returns the selected count
    pub fn end_marquee(&mut self) -> usize {
        let Some(area) = self.plan.area(self.active_area) else {
            self.selection.cancel_marquee();
            return 0;
        };
        let had_marquee = self.selection.marquee().is_some();
        let count = self.selection.end_marquee(&area.tables);
        if had_marquee {
            self.publish_selection();
        }
        count
    }

    pub fn toggle_selection(&mut self, entity: EntityRef) {
        self.selection.toggle(entity);
        self.publish_selection();
    }

    pub fn select_single(&mut self, entity: EntityRef) {
        self.selection.select_single(entity);
        self.publish_selection();
    }

    pub fn select_many(&mut self, entities: impl IntoIterator<Item = EntityRef>, append: bool) {
        self.selection.select_many(entities, append);
        self.publish_selection();
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.publish_selection();
        }
    }

    /// Switch the edited area, dropping selection and drafts
    pub fn set_active_area(&mut self, kind: AreaKind) {
        if kind == self.active_area {
            return;
        }
        self.active_area = kind;
        self.draw.cancel_draft();
        self.clear_selection();
        tracing::debug!(area = %kind, "Active area changed");
    }

    // ========== Batch transforms ==========

    fn commit_positions(
        &mut self,
        label: &str,
        updates: Vec<(TableId, Point)>,
    ) -> EngineResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }
        let count = updates.len();
        self.commit(ChangeReason::Transform, label, |area| {
            for (id, to) in updates {
                if let Some(table) = area.table_mut(id) {
                    table.position = to;
                }
            }
            Ok(count)
        })
    }

    /// Translate the selected unlocked tables; returns how many moved
    pub fn move_selected(&mut self, dx: f64, dy: f64) -> EngineResult<usize> {
        let ids = self.selection.selected_table_ids();
        let mut updates = Vec::new();
        transform::move_selected(&self.area_ref(self.active_area)?.tables, &ids, dx, dy, |id, p| {
            updates.push((id, p))
        });
        self.commit_positions("move selection", updates)
    }

    pub fn align_selected(&mut self, direction: AlignDirection) -> EngineResult<usize> {
        let ids = self.selection.selected_table_ids();
        if ids.len() < MIN_ALIGN {
            tracing::debug!(selected = ids.len(), "Align needs more tables");
            return Ok(0);
        }
        let mut updates = Vec::new();
        transform::align_selected(
            &self.area_ref(self.active_area)?.tables,
            &ids,
            direction,
            |id, p| updates.push((id, p)),
        );
        self.commit_positions("align selection", updates)
    }

    pub fn distribute_selected(&mut self, direction: DistributeDirection) -> EngineResult<usize> {
        let ids = self.selection.selected_table_ids();
        if ids.len() < MIN_DISTRIBUTE {
            tracing::debug!(selected = ids.len(), "Distribute needs more tables");
            return Ok(0);
        }
        let mut updates = Vec::new();
        transform::distribute_selected(
            &self.area_ref(self.active_area)?.tables,
            &ids,
            direction,
            |id, p| updates.push((id, p)),
        );
        self.commit_positions("distribute selection", updates)
    }

    /// Rotate the selected unlocked tables by `degrees`
    pub fn rotate_selected(&mut self, degrees: f64) -> EngineResult<usize> {
        let ids = self.selection.selected_table_ids();
        let mut updates = Vec::new();
        transform::rotate_selected(
            &self.area_ref(self.active_area)?.tables,
            &ids,
            degrees,
            |id, r| updates.push((id, r)),
        );
        if updates.is_empty() {
            return Ok(0);
        }
        let count = updates.len();
        self.commit(ChangeReason::Transform, "rotate selection", |area| {
            for (id, rotation) in updates {
                if let Some(table) = area.table_mut(id) {
                    table.rotation = rotation;
                }
            }
            Ok(count)
        })
    }

    // ========== Draw mode ==========

    /// Activate a drawing tool; clears the selection and any draft
    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        let changed = self.draw.set_mode(mode);
        self.clear_selection();
        if changed {
            self.events.publish(EngineEvent::DrawModeChanged { mode });
        }
    }

    pub fn cancel_draft(&mut self) -> bool {
        self.draw.cancel_draft()
    }

    /// Feed a pointer event to the active tool
    ///
    /// Commits and erasures become undoable commands on the active area.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> EngineResult<DrawEffect> {
        let kind = self.active_area;
        let area = self
            .plan
            .area(kind)
            .ok_or(EngineError::AreaMissing { expected: kind })?;
        let effect = self.draw.handle(event, &area.annotations);
        match &effect {
            DrawEffect::Commit(kind) => {
                let id = plan::allocate_id(&self.plan, &HashSet::new());
                let kind = kind.clone();
                self.commit(ChangeReason::Annotation, "draw annotation", |area| {
                    Ok(plan::add_annotation(area, id, kind))
                })?;
            }
            DrawEffect::Erase(id) => {
                let id = *id;
                self.commit(ChangeReason::Annotation, "erase annotation", |area| {
                    plan::delete_annotation(area, id)
                })?;
            }
            _ => {}
        }
        Ok(effect)
    }

    pub fn delete_annotation(&mut self, id: AnnotationId) -> EngineResult<Annotation> {
        self.commit(ChangeReason::Annotation, "delete annotation", |area| {
            plan::delete_annotation(area, id)
        })
    }

    // ========== Table editing ==========

    pub fn add_table(&mut self, data: TableCreate) -> EngineResult<TableId> {
        let id = plan::allocate_id(&self.plan, &HashSet::new());
        let max = self.config.max_seats_per_table;
        self.commit(ChangeReason::Edit, "add table", |area| {
            plan::add_table(area, id, data, max)
        })
    }

    /// Remove a table; its guests go back to the unassigned pool
    pub fn remove_table(&mut self, id: TableId) -> EngineResult<Vec<GuestId>> {
        self.commit(ChangeReason::Edit, "remove table", |area| {
            plan::remove_table(area, id)
        })
    }

    pub fn duplicate_table(&mut self, id: TableId) -> EngineResult<TableId> {
        let new_id = plan::allocate_id(&self.plan, &HashSet::new());
        self.commit(ChangeReason::Edit, "duplicate table", |area| {
            plan::duplicate_table(area, id, new_id)
        })
    }

    /// Commit a single-table drag
    pub fn move_table(&mut self, id: TableId, to: Point) -> EngineResult<()> {
        self.commit(ChangeReason::Edit, "move table", |area| {
            plan::move_table(area, id, to)
        })
    }

    pub fn rotate_table(&mut self, id: TableId, degrees: f64) -> EngineResult<()> {
        self.commit(ChangeReason::Edit, "rotate table", |area| {
            plan::rotate_table(area, id, degrees)
        })
    }

    pub fn resize_table(&mut self, id: TableId, shape: TableShape) -> EngineResult<()> {
        let max = self.config.max_seats_per_table;
        self.commit(ChangeReason::Edit, "resize table", |area| {
            plan::resize_table(area, id, shape, max)
        })
    }

    pub fn set_table_seats(&mut self, id: TableId, seats: u32) -> EngineResult<()> {
        let max = self.config.max_seats_per_table;
        self.commit(ChangeReason::Edit, "set seats", |area| {
            plan::set_table_seats(area, id, seats, max)
        })
    }

    pub fn set_auto_capacity(&mut self, id: TableId, enabled: bool) -> EngineResult<()> {
        let max = self.config.max_seats_per_table;
        self.commit(ChangeReason::Edit, "set auto capacity", |area| {
            plan::set_auto_capacity(area, id, enabled, max)
        })
    }

    pub fn rename_table(&mut self, id: TableId, name: &str) -> EngineResult<()> {
        self.commit(ChangeReason::Edit, "rename table", |area| {
            plan::rename_table(area, id, name)
        })
    }

    pub fn toggle_table_lock(&mut self, id: TableId) -> EngineResult<bool> {
        self.commit(ChangeReason::Edit, "toggle lock", |area| {
            plan::toggle_table_lock(area, id)
        })
    }

    pub fn fix_table_position(&mut self, id: TableId) -> EngineResult<Point> {
        self.commit(ChangeReason::Edit, "fix position", |area| {
            plan::fix_table_position(area, id)
        })
    }

    pub fn set_venue_size(&mut self, width: f64, height: f64) -> EngineResult<()> {
        self.commit(ChangeReason::Edit, "set venue size", |area| {
            plan::set_venue_size(area, width, height)
        })
    }

    /// Empty the active area; returns the released guests
    pub fn reset_area(&mut self) -> EngineResult<Vec<GuestId>> {
        self.commit(ChangeReason::Edit, "reset area", |area| {
            Ok(plan::reset_area(area))
        })
    }

    pub fn generate_banquet_layout(&mut self, layout: &BanquetLayout) -> EngineResult<Vec<TableId>> {
        if let Err(e) = layout.validate() {
            tracing::warn!(rows = layout.rows, cols = layout.cols, error = %e, "Banquet layout rejected");
            return Err(e);
        }
        let ids = plan::allocate_ids(&self.plan, layout.table_count());
        let max = self.config.max_seats_per_table;
        self.commit(ChangeReason::Edit, "generate layout", |area| {
            plan::generate_banquet_layout(area, layout, &ids, max)?;
            Ok(ids.clone())
        })
    }

    /// Release a guest from their table, in whichever area seats them
    pub fn unassign_guest(&mut self, guest_id: &str) -> EngineResult<TableId> {
        let kind = self
            .plan
            .areas
            .values()
            .find(|a| a.table_of_guest(guest_id).is_some())
            .map(|a| a.kind)
            .ok_or_else(|| EngineError::GuestNotFound(guest_id.to_string()))?;
        self.commit_plan(kind, ChangeReason::Assignment, "unassign guest", |plan| {
            let area = plan
                .areas
                .get_mut(&kind)
                .ok_or(EngineError::AreaMissing { expected: kind })?;
            plan::unassign_guest(area, guest_id)
        })
    }

    // ========== Guests & assignment ==========

    /// Replace the guest list and rescore both areas
    pub fn set_guests(&mut self, guests: Vec<Guest>) {
        self.guests = guests;
        for kind in AreaKind::ALL {
            self.refresh_analysis(kind);
        }
    }

    pub fn suggest_tables_for_guest(&self, guest_id: &str) -> Vec<TableSuggestion> {
        let guests = eligible_guests(&self.plan, self.active_area, &self.guests);
        match self.plan.area(self.active_area) {
            Some(area) => suggest_tables(area, &guests, guest_id),
            None => Vec::new(),
        }
    }

    fn set_proposal(&mut self, proposal: AssignmentProposal) {
        self.events.publish(EngineEvent::ProposalUpdated {
            proposal_id: proposal.id,
            area: proposal.area,
            score: proposal.score,
        });
        self.latest_proposal = Some(proposal);
    }

    /// Compute a best-fit proposal for the active area
    ///
    /// Guests seated in another area are not proposed again.
    pub fn request_local_assignment(&mut self) -> EngineResult<&AssignmentProposal> {
        let guests = eligible_guests(&self.plan, self.active_area, &self.guests);
        let proposal = local_assignment(self.area_ref(self.active_area)?, &guests);
        tracing::debug!(
            placed = proposal.mapping.len(),
            score = proposal.score,
            "Local assignment proposed"
        );
        self.set_proposal(proposal);
        self.latest_proposal.as_ref().ok_or(EngineError::ProposalNotFound)
    }

    /// Mark a remote request as in flight for the active area
    ///
    /// Any earlier in-flight request is superseded; its response will be
    /// discarded by [`Self::complete_server_assignment`].
    pub fn begin_server_assignment(&mut self) -> RemoteTicket {
        let ticket = self.remote.begin(self.active_area);
        self.publish_remote();
        ticket
    }

    /// Deliver the solver's answer for `ticket`
    ///
    /// Returns `Ok(false)` when the ticket was superseded or cancelled.
    /// A solver failure or an unusable response is reported as
    /// `EngineError::Solver` and leaves the `Failed` state visible.
    pub fn complete_server_assignment(
        &mut self,
        ticket: RemoteTicket,
        result: Result<SolverResponse, SolverError>,
    ) -> EngineResult<bool> {
        if !self.remote.is_current(&ticket) {
            tracing::warn!(ticket = ticket.id, "Discarding stale solver response");
            return Ok(false);
        }
        let normalized = result.and_then(|response| {
            let area = self.plan.area(ticket.area).ok_or_else(|| {
                SolverError::MalformedResponse(format!("area {} missing", ticket.area))
            })?;
            let guests = eligible_guests(&self.plan, ticket.area, &self.guests);
            normalize_response(area, &guests, response)
        });
        match normalized {
            Ok(proposal) => {
                self.remote.succeed(&ticket);
                self.publish_remote();
                self.set_proposal(proposal);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.id, error = %e, "Remote assignment failed");
                self.remote.fail(&ticket, e.clone());
                self.publish_remote();
                Err(e.into())
            }
        }
    }

    /// Abandon the in-flight remote request
    pub fn cancel_server_assignment(&mut self) -> bool {
        let cancelled = self.remote.cancel();
        if cancelled {
            self.publish_remote();
        }
        cancelled
    }

    /// Request, await and accept a remote proposal for the active area
    pub async fn request_server_assignment(
        &mut self,
        solver: &dyn AssignmentSolver,
    ) -> EngineResult<bool> {
        let ticket = self.begin_server_assignment();
        let area = self.area_ref(ticket.area)?.clone();
        let guests = eligible_guests(&self.plan, ticket.area, &self.guests);
        let result = solver.request_assignment(&area, &guests).await;
        self.complete_server_assignment(ticket, result)
    }

    fn publish_remote(&self) {
        self.events.publish(EngineEvent::RemoteStateChanged {
            status: self.remote.status().clone(),
        });
    }

    /// Apply the latest proposal as one command
    ///
    /// Returns the number of newly seated guests. The proposal is consumed
    /// on success.
    pub fn apply_assignment(&mut self) -> EngineResult<usize> {
        let proposal = self
            .latest_proposal
            .clone()
            .ok_or(EngineError::ProposalNotFound)?;
        let seated = self.apply_proposal(&proposal)?;
        self.latest_proposal = None;
        Ok(seated)
    }

    /// Apply any proposal, all or nothing
    pub fn apply_proposal(&mut self, proposal: &AssignmentProposal) -> EngineResult<usize> {
        let guests = self.guests.clone();
        self.commit_plan(
            proposal.area,
            ChangeReason::Assignment,
            "apply assignment",
            |plan| apply_proposal(plan, proposal, &guests),
        )
    }

    // ========== Persistence ==========

    /// Load both areas and the guest list for a wedding
    ///
    /// An area the store has never seen starts empty. Nothing changes
    /// unless every load succeeds. History is cleared.
    pub async fn load(
        &mut self,
        store: &dyn SnapshotStore,
        directory: &dyn GuestDirectory,
        wedding_id: &str,
    ) -> EngineResult<()> {
        let mut areas = BTreeMap::new();
        for kind in AreaKind::ALL {
            let area = match store.load_area(wedding_id, kind).await {
                Ok(mut area) => {
                    let fixed =
                        plan::refresh_auto_capacity(&mut area, self.config.max_seats_per_table);
                    if fixed > 0 {
                        tracing::warn!(wedding_id, area = %kind, tables = fixed, "Stored seat counts recomputed");
                    }
                    area
                }
                Err(StoreError::NotFound { .. }) => Self::empty_area(&self.config, kind),
                Err(e) => {
                    tracing::error!(wedding_id, area = %kind, error = %e, "Area load failed");
                    return Err(e.into());
                }
            };
            areas.insert(kind, area);
        }
        let guests = directory.list_guests(wedding_id).await?;

        self.wedding_id = Some(wedding_id.to_string());
        self.plan = PlanSnapshot { areas };
        self.guests = guests;
        self.history.clear();
        self.dirty.clear();
        self.latest_proposal = None;
        self.remote.cancel();
        self.draw.cancel_draft();
        self.selection.clear();
        tracing::info!(wedding_id, guests = self.guests.len(), "Seating plan loaded");

        self.publish_selection();
        for kind in AreaKind::ALL {
            self.events.publish(EngineEvent::PlanChanged {
                area: kind,
                reason: ChangeReason::Load,
            });
            self.refresh_analysis(kind);
        }
        self.publish_history();
        Ok(())
    }

    /// Save every dirty area; returns how many were saved
    ///
    /// Areas that fail stay dirty and the first failure is returned after
    /// the remaining areas have been tried.
    pub async fn persist(&mut self, store: &dyn SnapshotStore) -> EngineResult<usize> {
        let wedding_id = self
            .wedding_id
            .clone()
            .ok_or_else(|| StoreError::Unavailable("no wedding loaded".into()))?;
        let mut saved = 0;
        let mut first_error = None;
        for kind in self.dirty.clone() {
            let Some(area) = self.plan.area(kind) else {
                continue;
            };
            match store.save_area(&wedding_id, kind, area).await {
                Ok(()) => {
                    self.dirty.remove(&kind);
                    saved += 1;
                }
                Err(e) => {
                    tracing::error!(wedding_id = %wedding_id, area = %kind, error = %e, "Area save failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(saved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> SeatingEngine {
        SeatingEngine::new(EngineConfig::from_env().with_max_seats(0).with_history_limit(100))
    }

    fn round_at(x: f64, y: f64) -> TableCreate {
        TableCreate::new(TableShape::Round { diameter: 150.0 }, Point::new(x, y))
    }

    #[test]
    fn test_new_engine_is_clean() {
        let engine = engine();
        assert!(!engine.can_undo());
        assert!(!engine.can_redo());
        assert!(!engine.is_dirty());
        assert_eq!(engine.current_draw_mode(), DrawMode::Pan);
        assert_eq!(engine.latest_analysis().map(|a| a.score), Some(0.0));
    }

    #[test]
    fn test_failed_command_pushes_nothing() {
        let mut engine = engine();
        let err = engine.move_table(42, Point::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, EngineError::TableNotFound(42)));
        assert!(!engine.can_undo());
        assert!(!engine.is_dirty());
    }

    #[test]
    fn test_noop_command_pushes_nothing() {
        let mut engine = engine();
        let id = engine.add_table(round_at(100.0, 100.0)).unwrap();
        engine.move_table(id, Point::new(100.0, 100.0)).unwrap();
        assert_eq!(engine.history.len(), 1);
    }

    #[test]
    fn test_snap_applies_to_moved_tables_only() {
        let mut engine = SeatingEngine::new(EngineConfig::from_env().with_snap_to_grid(20.0));
        let a = engine.add_table(round_at(100.0, 100.0)).unwrap();
        let b = engine.add_table(round_at(303.0, 100.0)).unwrap();
        assert_eq!(
            engine.area(AreaKind::Banquet).unwrap().table(b).unwrap().position,
            Point::new(300.0, 100.0)
        );
        engine.move_table(a, Point::new(131.0, 149.0)).unwrap();
        let area = engine.area(AreaKind::Banquet).unwrap();
        assert_eq!(area.table(a).unwrap().position, Point::new(140.0, 140.0));
        assert_eq!(area.table(b).unwrap().position, Point::new(300.0, 100.0));
    }

    #[test]
    fn test_set_draw_mode_clears_selection() {
        let mut engine = engine();
        let id = engine.add_table(round_at(100.0, 100.0)).unwrap();
        engine.select_single(EntityRef::Table(id));
        engine.start_marquee(Point::new(0.0, 0.0));
        engine.set_draw_mode(DrawMode::Boundary);
        assert!(engine.selected_ids().is_empty());
        assert!(engine.selection().marquee().is_none());
        assert_eq!(engine.current_draw_mode(), DrawMode::Boundary);
    }

    #[test]
    fn test_removed_table_leaves_selection() {
        let mut engine = engine();
        let id = engine.add_table(round_at(100.0, 100.0)).unwrap();
        engine.select_single(EntityRef::Table(id));
        engine.remove_table(id).unwrap();
        assert!(engine.selected_ids().is_empty());
    }

    #[test]
    fn test_stale_remote_response_is_dropped() {
        let mut engine = engine();
        let first = engine.begin_server_assignment();
        let second = engine.begin_server_assignment();
        assert!(
            !engine
                .complete_server_assignment(first, Ok(SolverResponse::default()))
                .unwrap()
        );
        assert!(engine.latest_proposal().is_none());
        assert!(engine.remote_status().is_pending());
        assert!(
            engine
                .complete_server_assignment(second, Ok(SolverResponse::default()))
                .unwrap()
        );
        assert!(engine.latest_proposal().is_some());
    }

    #[test]
    fn test_apply_without_proposal() {
        let mut engine = engine();
        assert!(matches!(
            engine.apply_assignment(),
            Err(EngineError::ProposalNotFound)
        ));
    }

    #[derive(Debug, Clone, Copy)]
    enum Batch {
        Move(f64, f64),
        Align(usize),
        Distribute(bool),
        Rotate(f64),
    }

    const ALIGNMENTS: [AlignDirection; 6] = [
        AlignDirection::Left,
        AlignDirection::Right,
        AlignDirection::Top,
        AlignDirection::Bottom,
        AlignDirection::CenterH,
        AlignDirection::CenterV,
    ];

    fn batch() -> impl Strategy<Value = Batch> {
        prop_oneof![
            (-300.0f64..300.0, -300.0f64..300.0).prop_map(|(dx, dy)| Batch::Move(dx, dy)),
            (0usize..6).prop_map(Batch::Align),
            any::<bool>().prop_map(Batch::Distribute),
            (-720.0f64..720.0).prop_map(Batch::Rotate),
        ]
    }

    proptest! {
        #[test]
        fn prop_undo_restores_plan_after_any_batch(
            coords in proptest::collection::vec((0.0f64..1500.0, 0.0f64..1000.0), 0..8),
            locked in proptest::collection::vec(any::<bool>(), 8),
            op in batch(),
        ) {
            let mut config = EngineConfig::from_env().with_max_seats(0);
            config.snap_to_grid = false;
            let mut engine = SeatingEngine::new(config);
            let mut ids = Vec::new();
            for (i, (x, y)) in coords.iter().enumerate() {
                let id = engine.add_table(round_at(*x, *y)).unwrap();
                if locked[i] {
                    engine.toggle_table_lock(id).unwrap();
                }
                ids.push(id);
            }
            engine.select_many(ids.iter().map(|id| EntityRef::Table(*id)), false);
            let before = engine.plan().clone();

            let changed = match op {
                Batch::Move(dx, dy) => engine.move_selected(dx, dy),
                Batch::Align(i) => engine.align_selected(ALIGNMENTS[i]),
                Batch::Distribute(true) => engine.distribute_selected(DistributeDirection::Horizontal),
                Batch::Distribute(false) => engine.distribute_selected(DistributeDirection::Vertical),
                Batch::Rotate(degrees) => engine.rotate_selected(degrees),
            }
            .unwrap();

            if changed == 0 {
                prop_assert_eq!(engine.plan(), &before);
            } else {
                let after = engine.plan().clone();
                prop_assert!(engine.undo());
                prop_assert_eq!(engine.plan(), &before);
                prop_assert!(engine.redo());
                prop_assert_eq!(engine.plan(), &after);
            }
        }
    }
}
