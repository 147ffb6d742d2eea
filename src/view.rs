use crate::clock::Clock;
use crate::dates::{parse_date_input, to_input_value, to_iso_string};
use crate::errors::RegistryError;
use crate::models::{CounterId, CounterPatch, CounterRecord, CounterView, FieldValues};
use crate::registry::CounterRegistry;
use crate::storage::KeyValueStore;
use crate::time_math::{elapsed_since, Elapsed};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddRequested,
    UpdateRequested(CounterId),
    RemoveRequested(CounterId),
}

/// Rendering side of the page. Owns its own element keys; only ever sees
/// counters through snapshots.
pub trait View {
    /// Current input values of a counter card, or of the add form for `None`.
    fn read_fields(&self, id: Option<&CounterId>) -> Option<FieldValues>;
    /// `elapsed` is `None` when the counter has no valid date.
    fn render(&mut self, record: &CounterRecord, elapsed: Option<Elapsed>);
    fn unmount(&mut self, id: &CounterId);
}

/// Turns user intents into registry calls and renders the outcome. The clock
/// is sampled here and nowhere else for elapsed time.
pub struct ViewBinding<'a, S> {
    registry: &'a mut CounterRegistry<S>,
    clock: &'a dyn Clock,
}

impl<'a, S: KeyValueStore> ViewBinding<'a, S> {
    pub fn new(registry: &'a mut CounterRegistry<S>, clock: &'a dyn Clock) -> Self {
        Self { registry, clock }
    }

    /// Handles one intent. Returns the id the intent acted on.
    pub fn dispatch<V: View + ?Sized>(&mut self, intent: Intent, view: &mut V) -> Result<CounterId, RegistryError> {
        debug!(?intent, "dispatching intent");
        match intent {
            Intent::AddRequested => {
                let fields = view.read_fields(None).unwrap_or_default();
                let date = parse_date_input(&fields.date);
                let id = self.registry.create(Some(fields.title), date)?;
                if let Some(record) = self.registry.get(&id) {
                    render_one(self.clock, record, view);
                }
                Ok(id)
            }
            Intent::UpdateRequested(id) => {
                let patch = view
                    .read_fields(Some(&id))
                    .map(|fields| CounterPatch::from_fields(&fields))
                    .unwrap_or_default();
                let record = self.registry.update(&id, patch)?;
                render_one(self.clock, &record, view);
                Ok(id)
            }
            Intent::RemoveRequested(id) => {
                self.registry.remove(&id)?;
                view.unmount(&id);
                Ok(id)
            }
        }
    }

    pub fn render_all<V: View + ?Sized>(&self, view: &mut V) {
        for record in self.registry.list() {
            render_one(self.clock, &record, view);
        }
    }
}

fn render_one<V: View + ?Sized>(clock: &dyn Clock, record: &CounterRecord, view: &mut V) {
    let elapsed = record
        .target_instant()
        .map(|target| elapsed_since(target, clock.now()));
    view.render(record, elapsed);
}

pub fn counter_view(record: &CounterRecord, elapsed: Option<Elapsed>) -> CounterView {
    let message = match (elapsed, record.formatted_date()) {
        (Some(elapsed), Some(formatted)) => Some(format!(
            "It has been {} days, {} hours and {} minutes of days without {} that started on {}.",
            elapsed.days,
            elapsed.hours,
            elapsed.minutes,
            record.title(),
            formatted
        )),
        _ => None,
    };

    CounterView {
        id: record.id().clone(),
        title: record.title().to_string(),
        date: record.target_instant().map(to_iso_string),
        input_value: record.target_instant().map(to_input_value),
        formatted_date: record.formatted_date().map(str::to_string),
        elapsed,
        message,
    }
}

/// View fed by one request's form values that collects what gets rendered.
#[derive(Debug, Default)]
pub struct JsonView {
    fields: Option<FieldValues>,
    rendered: Vec<CounterView>,
    removed: Vec<CounterId>,
}

impl JsonView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: FieldValues) -> Self {
        Self {
            fields: Some(fields),
            ..Self::default()
        }
    }

    pub fn rendered(&self) -> &[CounterView] {
        &self.rendered
    }

    pub fn removed(&self) -> &[CounterId] {
        &self.removed
    }

    pub fn into_rendered(self) -> Vec<CounterView> {
        self.rendered
    }
}

impl View for JsonView {
    fn read_fields(&self, _id: Option<&CounterId>) -> Option<FieldValues> {
        self.fields.clone()
    }

    fn render(&mut self, record: &CounterRecord, elapsed: Option<Elapsed>) {
        let view = counter_view(record, elapsed);
        match self.rendered.iter_mut().find(|existing| existing.id == view.id) {
            Some(existing) => *existing = view,
            None => self.rendered.push(view),
        }
    }

    fn unmount(&mut self, id: &CounterId) {
        self.rendered.retain(|view| &view.id != id);
        self.removed.push(id.clone());
    }
}
