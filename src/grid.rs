//! `DetailsGrid`: one component instance.
//!
//! Owns the column state, the corpus, the displayed projection and the selection.
//! Every column change goes through `transition` and is swapped in whole; the
//! requested re-evaluation then runs against the new state.
//!
//! Re-evaluation recomputes only the axis that changed:
//! * sort: sort the corpus, then apply the stored filters;
//! * filter: filter the corpus, then sort by the stored sort column.
//!
//! With a sort or filter override the built-in evaluation is skipped and the
//! override receives the column state instead.

use crate::{
    Column, ColumnAction, ColumnDefinition, ColumnMenu, Effect, FieldType, FilterChip, FilterKey,
    FilterOption, GridConfig, GridError, GridHandlers, GridResult, Item, LazyLoadDetails,
    LoadMoreCallback, LoadMoreFuture, SelectionCoordinator, SelectionOutcome, SentinelController,
    SentinelId, SentinelPlacement, SortDirection, SortState, UniqueElements, build_columns,
    build_menu, derive_options, filter_chips, filter_items, filtered_columns, find_column,
    format_cell, menu_options, sentinel_placement, sort_items, sorted_column, transition,
};

#[derive(Debug)]
pub struct DetailsGrid {
    config: GridConfig,
    definitions: Vec<ColumnDefinition>,
    columns: Vec<Column>,
    /// Corpus used for evaluation and option derivation.
    all_items: Vec<Item>,
    displayed: Vec<Item>,
    selection: SelectionCoordinator,
    sentinel: SentinelController,
    handlers: GridHandlers,
}

impl DetailsGrid {
    /// Creates an unmounted grid: columns are built, nothing is replayed yet.
    ///
    /// ### Errors
    /// `InvalidFormat` for an unusable date/time pattern, `DuplicateColumn` for
    /// repeated field names.
    pub fn new(config: GridConfig, definitions: Vec<ColumnDefinition>) -> GridResult<Self> {
        config.validate()?;
        let columns = build_columns(&definitions, &config)?;

        Ok(DetailsGrid {
            selection: SelectionCoordinator::new(config.max_selection_count),
            sentinel: SentinelController::new(config.lazy_load, None),
            config,
            definitions,
            columns,
            all_items: Vec::new(),
            displayed: Vec::new(),
            handlers: GridHandlers::default(),
        })
    }

    pub fn with_handlers(mut self, handlers: GridHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Supplies the load-more callback; the sentinel observer exists only if lazy
    /// loading is enabled as well.
    pub fn with_load_more(mut self, callback: LoadMoreCallback) -> Self {
        self.sentinel = SentinelController::new(self.config.lazy_load, Some(callback));
        self
    }

    /// Loads the items and replays the initial sort and filters.
    ///
    /// ### Arguments
    /// * `items`: The visible items (possibly already paginated by the host).
    /// * `all_items`: The corpus; `None` makes `items` double as the corpus.
    pub fn mount(mut self, items: Vec<Item>, all_items: Option<Vec<Item>>) -> GridResult<Self> {
        self.all_items = all_items.unwrap_or_else(|| items.clone());
        self.displayed = items;
        self.set_up_initial_load()?;
        tracing::info!(
            "Grid mounted: {} columns, {} displayed of {} items",
            self.columns.len(),
            self.displayed.len(),
            self.all_items.len()
        );
        Ok(self)
    }

    /// Replaces the column definitions. Prior sort and filter state is discarded
    /// and the initial sort/filters are replayed.
    pub fn set_column_definitions(&mut self, definitions: Vec<ColumnDefinition>) -> GridResult<()> {
        self.definitions = definitions;
        self.set_up_initial_load()
    }

    fn set_up_initial_load(&mut self) -> GridResult<()> {
        self.columns = build_columns(&self.definitions, &self.config)?;

        if let Some(initial_sort) = self.config.initial_sort.clone() {
            let action = ColumnAction::choose_sort(&initial_sort.field_name, initial_sort.direction);
            let next = transition(&self.columns, &action)?;
            self.columns = next.columns;
            // The initial sort runs on the unfiltered corpus and is not offered to an override.
            if !self.handlers.overrides_sort()
                && let Some(column) = sorted_column(&self.columns).cloned()
            {
                self.apply_default_sort(&column, &[]);
            }
        }

        for initial_filter in self.config.initial_filters.clone() {
            let field_name = initial_filter.field_name.as_str();
            let mut values = initial_filter.filter_values;

            // Range values are positional: [min, max].
            if self.column(field_name)?.filter_field_type() == Some(FieldType::NumberRange) {
                let bound = |position: usize| values.get(position).map(String::as_str);
                self.apply(&ColumnAction::range(field_name, bound(0), bound(1)))?;
                continue;
            }

            values.unique();
            for value in values {
                let filter_key = self.initial_filter_key(field_name, &value)?;
                self.apply(&ColumnAction::toggle(field_name, filter_key, &value))?;
            }
        }
        Ok(())
    }

    /// Key of a replayed filter value. Combo columns store the key of the option
    /// carrying the same text, so the pre-selected option can be toggled off.
    fn initial_filter_key(&self, field_name: &str, value: &str) -> GridResult<FilterKey> {
        let column = self.column(field_name)?;
        let is_combo = column.uses_time_matching()
            || matches!(
                column.filter_field_type(),
                Some(FieldType::Choice | FieldType::PartialChoice)
            );

        let option_key = is_combo
            .then(|| menu_options(&self.all_items, column))
            .and_then(|options| options.into_iter().find(|option| option.text == value))
            .map(|option| option.key);

        Ok(option_key.unwrap_or_else(|| FilterKey::from(value)))
    }

    /// Replaces the items. Column state survives; active filters (or, without
    /// filters, the active sort) are re-applied unless overridden.
    pub fn set_items(&mut self, items: Vec<Item>, all_items: Option<Vec<Item>>) {
        self.all_items = all_items.unwrap_or_else(|| items.clone());
        self.replace_displayed(items);

        let has_filters = self.columns.iter().any(Column::is_filtered);
        let has_sort = sorted_column(&self.columns).is_some();

        if has_filters && !self.handlers.overrides_filter() {
            self.handle_filter();
        } else if has_sort && !self.handlers.overrides_sort() {
            self.handle_sort();
        }
    }

    // --- Transitions ---

    /// Applies one column action and runs the re-evaluation it requests.
    pub fn apply(&mut self, action: &ColumnAction) -> GridResult<Effect> {
        let next = transition(&self.columns, action)?;
        self.columns = next.columns;

        match next.effect {
            Effect::None => {}
            Effect::Sort => self.handle_sort(),
            Effect::Filter => self.handle_filter(),
        }
        Ok(next.effect)
    }

    pub fn choose_sort(&mut self, field_name: &str, direction: SortDirection) -> GridResult<Effect> {
        self.apply(&ColumnAction::choose_sort(field_name, direction))
    }

    pub fn add_or_remove_filter_value(
        &mut self,
        field_name: &str,
        filter_key: impl Into<FilterKey>,
        filter_text: &str,
    ) -> GridResult<Effect> {
        self.apply(&ColumnAction::toggle(field_name, filter_key, filter_text))
    }

    pub fn remove_filter_value(
        &mut self,
        field_name: &str,
        filter_key: impl Into<FilterKey>,
    ) -> GridResult<Effect> {
        self.apply(&ColumnAction::remove(field_name, filter_key))
    }

    pub fn set_range_bounds(
        &mut self,
        field_name: &str,
        min: Option<&str>,
        max: Option<&str>,
    ) -> GridResult<Effect> {
        self.apply(&ColumnAction::range(field_name, min, max))
    }

    pub fn clear_column_filter(&mut self, field_name: &str) -> GridResult<Effect> {
        self.apply(&ColumnAction::clear_column(field_name))
    }

    pub fn clear_all_filters(&mut self) -> GridResult<Effect> {
        self.apply(&ColumnAction::ClearAllFilters)
    }

    // --- Re-evaluation ---

    fn handle_sort(&mut self) {
        let Some(sort_column) = sorted_column(&self.columns).cloned() else {
            return;
        };
        let filtered = filtered_columns(&self.columns);

        match self.handlers.on_sort.as_mut() {
            Some(on_sort) => {
                tracing::debug!("Sort on '{}' delegated to override", sort_column.field_name);
                on_sort(&filtered, &sort_column);
            }
            None => self.apply_default_sort(&sort_column, &filtered),
        }
    }

    fn handle_filter(&mut self) {
        let filtered = filtered_columns(&self.columns);
        let sort_column = sorted_column(&self.columns).cloned();

        match self.handlers.on_filter.as_mut() {
            Some(on_filter) => {
                tracing::debug!("Filter on {} columns delegated to override", filtered.len());
                on_filter(&filtered, sort_column.as_ref());
            }
            None => self.apply_default_filter(&filtered, sort_column.as_ref()),
        }
    }

    fn apply_default_sort(&mut self, sort_column: &Column, filtered: &[Column]) {
        let sorted = sort_items(self.all_items.clone(), sort_column);
        let items = filter_items(sorted, filtered);
        self.replace_displayed(items);

        if let Some(observer) = self.handlers.on_default_sort_applied.as_mut() {
            observer(&self.displayed, filtered, Some(sort_column));
        }
    }

    fn apply_default_filter(&mut self, filtered: &[Column], sort_column: Option<&Column>) {
        let mut items = filter_items(self.all_items.clone(), filtered);
        if let Some(column) = sort_column {
            items = sort_items(items, column);
        }
        self.replace_displayed(items);

        if let Some(observer) = self.handlers.on_default_filter_applied.as_mut() {
            observer(&self.displayed, filtered, sort_column);
        }
    }

    fn replace_displayed(&mut self, items: Vec<Item>) {
        tracing::debug!("Displayed items: {} -> {}", self.displayed.len(), items.len());
        self.displayed = items;

        // Indices refer to the previous projection.
        let had_selection = !self.selection.committed_indices().is_empty();
        self.selection.reset();
        if had_selection {
            self.publish_selection();
        }
    }

    // --- Queries ---

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn displayed_items(&self) -> &[Item] {
        &self.displayed
    }

    pub fn all_items(&self) -> &[Item] {
        &self.all_items
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, field_name: &str) -> GridResult<&Column> {
        find_column(&self.columns, field_name)
    }

    /// Number of currently filtered columns.
    pub fn filter_count(&self) -> usize {
        self.columns.iter().filter(|column| column.is_filtered()).count()
    }

    /// The clear-all affordance exists iff some definition declares filter details.
    pub fn has_filterable_columns(&self) -> bool {
        self.definitions
            .iter()
            .any(|definition| definition.filter_details.is_some())
    }

    /// The clear-all affordance is enabled iff some column is filtered.
    pub fn clear_all_enabled(&self) -> bool {
        self.filter_count() > 0
    }

    /// Label of the clear-all affordance: `Clear Filters`, or `Clear Filters (2)`
    /// while two columns are filtered.
    pub fn clear_all_label(&self) -> String {
        match self.filter_count() {
            0 => "Clear Filters".to_string(),
            count => format!("Clear Filters ({count})"),
        }
    }

    pub fn sort_state(&self, field_name: &str) -> GridResult<SortState> {
        Ok(SortState::of(self.column(field_name)?))
    }

    /// Autocomplete options of a column, derived from the corpus.
    pub fn options_for(
        &self,
        field_name: &str,
        partial_text: Option<&str>,
    ) -> GridResult<Vec<FilterOption>> {
        let column = self.column(field_name)?;
        Ok(derive_options(&self.all_items, column, partial_text))
    }

    /// Context menu of a column; `None` if its menu affordance is disabled.
    pub fn menu_for(&self, field_name: &str) -> GridResult<Option<ColumnMenu>> {
        let column = self.column(field_name)?;
        Ok(build_menu(column, &self.all_items, self.config.enable_filter))
    }

    /// Default text of one displayed cell.
    pub fn cell_text(&self, row: usize, field_name: &str) -> GridResult<String> {
        let column = self.column(field_name)?;
        let item = self
            .displayed
            .get(row)
            .ok_or_else(|| GridError::Other(format!("row {row} is not displayed")))?;
        Ok(format_cell(item, column))
    }

    // --- Selection ---

    /// Toggles one displayed row. Ignored when checkboxes are hidden.
    pub fn toggle_row(&mut self, row: usize) -> Option<SelectionOutcome> {
        if !self.config.checkbox_visibility.selection_enabled() || row >= self.displayed.len() {
            return None;
        }
        let outcome = self.selection.toggle(row);
        if matches!(outcome, SelectionOutcome::Committed(_)) {
            self.publish_selection();
        }
        Some(outcome)
    }

    /// Runs a scheduled over-selection rollback; the host calls this once the
    /// toggle that caused it has settled.
    pub fn settle_selection(&mut self) -> Option<SelectionOutcome> {
        let outcome = self.selection.run_deferred()?;
        if matches!(outcome, SelectionOutcome::Committed(_)) {
            self.publish_selection();
        }
        Some(outcome)
    }

    pub fn selection(&self) -> &SelectionCoordinator {
        &self.selection
    }

    pub fn selected_items(&self) -> Vec<Item> {
        self.selection.committed_items(&self.displayed)
    }

    fn publish_selection(&mut self) {
        let selected = self.selection.committed_items(&self.displayed);
        if let Some(on_selection_change) = self.handlers.on_selection_change.as_mut() {
            on_selection_change(&selected);
        }
    }

    /// Chips of the committed selection; empty without chip configuration.
    pub fn filter_chips(&self) -> Vec<FilterChip> {
        match self.config.filter_chip_details.as_ref() {
            Some(details) => filter_chips(&self.selected_items(), details),
            None => Vec::new(),
        }
    }

    /// Removes a chip: deselects its item, republishes the selection and notifies
    /// the chip-removed callback.
    pub fn remove_chip(&mut self, key: &str) -> GridResult<Item> {
        let (item, outcome) = self.selection.remove_chip(
            &self.displayed,
            self.config.filter_chip_details.as_ref(),
            key,
        )?;
        if matches!(outcome, SelectionOutcome::Committed(_)) {
            self.publish_selection();
        }
        if let Some(on_filter_chip_remove) = self.handlers.on_filter_chip_remove.as_mut() {
            on_filter_chip_remove(&item);
        }
        Ok(item)
    }

    /// Row activation (double click). Returns `false` for a row outside the displayed set.
    pub fn invoke_row(&mut self, row: usize) -> bool {
        let Some(item) = self.displayed.get(row) else {
            return false;
        };
        if let Some(on_row_invoked) = self.handlers.on_row_invoked.as_mut() {
            on_row_invoked(item, row);
        }
        true
    }

    // --- Lazy load ---

    /// Updates the host lazy-load flags (e.g. after a page arrived).
    pub fn set_lazy_load(&mut self, details: LazyLoadDetails) {
        self.config.lazy_load = details;
        self.sentinel.update_details(details);
    }

    pub fn sentinel_placement(&self) -> SentinelPlacement {
        sentinel_placement(&self.config.lazy_load, self.displayed.len())
    }

    /// Attaches the sentinel rendered for the current placement, if it is observable.
    pub fn attach_sentinel(&mut self) -> Option<SentinelId> {
        match self.sentinel_placement() {
            SentinelPlacement::AfterRow(row) => {
                let id = SentinelId(row);
                self.sentinel.attach(id).then_some(id)
            }
            SentinelPlacement::Hidden | SentinelPlacement::Standalone => None,
        }
    }

    pub fn on_sentinel_visibility(
        &mut self,
        sentinel: SentinelId,
        is_visible: bool,
    ) -> Option<LoadMoreFuture> {
        self.sentinel.on_visibility_changed(sentinel, is_visible)
    }

    pub fn sentinel(&self) -> &SentinelController {
        &self.sentinel
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
