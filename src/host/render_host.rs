//! The rendering host: mounts views, applies queued updates, re-renders.

use slotmap::SecondaryMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, warn};

use super::config::HostConfig;
use super::error::HostError;
use crate::event::ui::UiEvent;
use crate::state::runtime::{self, InstanceId, RenderRequest};
use crate::state::SlotError;
use crate::view::{Node, View, ViewContext};

/// What one [`Host::flush`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Updates applied across all passes.
    pub applied: usize,
    /// Instances re-rendered, in render order.
    pub rerendered: Vec<InstanceId>,
    /// Apply/re-render passes run before the queue settled.
    pub passes: usize,
}

impl FlushReport {
    pub fn is_empty(&self) -> bool {
        self.applied == 0 && self.rerendered.is_empty()
    }

    /// How many times `id` was re-rendered by this flush.
    pub fn renders_of(&self, id: InstanceId) -> usize {
        self.rerendered.iter().filter(|r| **r == id).count()
    }
}

struct Mounted {
    name: String,
    view: Box<dyn View>,
    tree: Node,
    renders: u64,
}

/// Owns mounted view instances and their latest trees.
///
/// Replacements only queue; nothing re-renders until [`flush`](Self::flush)
/// runs. [`dispatch`](Self::dispatch) wraps a handler in a batch and flushes
/// afterwards, so each event turn renders an affected instance once.
pub struct Host {
    mounted: SecondaryMap<InstanceId, Mounted>,
    order: Vec<InstanceId>,
    requests_tx: UnboundedSender<RenderRequest>,
    requests: UnboundedReceiver<RenderRequest>,
    config: HostConfig,
}

impl Host {
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    pub fn with_config(config: HostConfig) -> Self {
        let (requests_tx, requests) = unbounded_channel();
        Self {
            mounted: SecondaryMap::new(),
            order: Vec::new(),
            requests_tx,
            requests,
            config,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Mount a view and render it once.
    ///
    /// If the first render fails the instance is discarded and the error
    /// returned.
    pub fn mount(&mut self, view: impl View + 'static) -> Result<InstanceId, HostError> {
        let id = runtime::register_instance(self.requests_tx.clone());
        let name = view.name().to_owned();

        match render_instance(id, &view, 1) {
            Ok(tree) => {
                debug!(instance = ?id, view = %name, "mounted view");
                self.mounted.insert(
                    id,
                    Mounted {
                        name,
                        view: Box::new(view),
                        tree,
                        renders: 1,
                    },
                );
                self.order.push(id);
                Ok(id)
            }
            Err(err) => {
                runtime::remove_instance(id);
                error!(view = %name, %err, "mount failed");
                Err(err.into())
            }
        }
    }

    /// Unmount an instance, dropping its slots. Updates still queued for it
    /// are discarded at the next flush. Returns `false` if it was not mounted.
    pub fn unmount(&mut self, id: InstanceId) -> bool {
        let Some(mounted) = self.mounted.remove(id) else {
            return false;
        };
        self.order.retain(|other| *other != id);
        runtime::remove_instance(id);
        debug!(instance = ?id, view = %mounted.name, "unmounted view");
        true
    }

    // ── Flush ────────────────────────────────────────────────────────

    /// Apply every queued update, then re-render each instance that received
    /// one, once. Repeats while renders queue further updates, up to
    /// [`HostConfig::max_flush_passes`].
    ///
    /// If a re-render fails, the other dirty instances of that pass still
    /// render and the first error is returned.
    ///
    /// Inside an open [`batch`](crate::state::batch) this does nothing; the
    /// outermost caller flushes.
    pub fn flush(&mut self) -> Result<FlushReport, HostError> {
        let mut report = FlushReport::default();
        if runtime::in_batch() {
            debug!("flush deferred until the batch closes");
            return Ok(report);
        }

        loop {
            let applied = runtime::apply_pending().inspect_err(|err| {
                error!(%err, "applying updates failed");
            })?;
            let dirty = self.drain_requests();
            if applied == 0 && dirty.is_empty() {
                break;
            }
            if report.passes >= self.config.max_flush_passes {
                error!(passes = report.passes, "update loop detected");
                return Err(HostError::UpdateLoop {
                    passes: report.passes,
                });
            }
            report.passes += 1;
            report.applied += applied;

            // Every dirty instance gets its render even if an earlier one
            // fails; their requests are already drained.
            let mut failed = None;
            for id in dirty {
                match self.rerender(id) {
                    Ok(true) => report.rerendered.push(id),
                    Ok(false) => {}
                    Err(err) => {
                        failed.get_or_insert(err);
                    }
                }
            }
            if let Some(err) = failed {
                return Err(err);
            }
        }

        if !report.is_empty() {
            debug!(
                applied = report.applied,
                rerendered = report.rerendered.len(),
                passes = report.passes,
                "flushed"
            );
        }
        Ok(report)
    }

    /// Run `f` as one batch and flush afterwards.
    pub fn batch<R>(&mut self, f: impl FnOnce() -> R) -> Result<R, HostError> {
        let out = runtime::batch(f);
        self.flush()?;
        Ok(out)
    }

    /// Deliver `event` to the handler registered for its kind on the element
    /// keyed `target` in the instance's current tree, then flush.
    ///
    /// Returns `Ok(false)` when no such element or handler exists.
    pub fn dispatch(
        &mut self,
        id: InstanceId,
        target: &str,
        event: UiEvent,
    ) -> Result<bool, HostError> {
        let mounted = self
            .mounted
            .get(id)
            .ok_or(HostError::UnknownInstance(id))?;
        let Some(handler) = mounted
            .tree
            .find(target)
            .and_then(|el| el.handler(event.kind()))
        else {
            debug!(instance = ?id, key = target, kind = ?event.kind(), "no handler for event");
            return Ok(false);
        };

        runtime::batch(|| handler(&event));
        self.flush()?;
        Ok(true)
    }

    fn drain_requests(&mut self) -> Vec<InstanceId> {
        let mut dirty = Vec::new();
        while let Ok(RenderRequest { instance }) = self.requests.try_recv() {
            if !self.mounted.contains_key(instance) {
                continue;
            }
            if !dirty.contains(&instance) {
                dirty.push(instance);
            }
        }
        dirty
    }

    /// Re-render one instance. Returns `false` if it is no longer mounted.
    fn rerender(&mut self, id: InstanceId) -> Result<bool, HostError> {
        let Some(mounted) = self.mounted.get_mut(id) else {
            warn!(instance = ?id, "render requested for unknown instance");
            return Ok(false);
        };
        let next = mounted.renders + 1;
        match render_instance(id, &*mounted.view, next) {
            Ok(tree) => {
                mounted.tree = tree;
                mounted.renders = next;
                Ok(true)
            }
            Err(err) => {
                error!(instance = ?id, view = %mounted.name, %err, "render failed");
                Err(err.into())
            }
        }
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// The latest tree of a mounted instance.
    pub fn tree(&self, id: InstanceId) -> Option<&Node> {
        self.mounted.get(id).map(|m| &m.tree)
    }

    /// How many times an instance has rendered, including its mount.
    pub fn render_count(&self, id: InstanceId) -> Option<u64> {
        self.mounted.get(id).map(|m| m.renders)
    }

    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.mounted.contains_key(id)
    }

    pub fn instance_count(&self) -> usize {
        self.order.len()
    }

    /// Mounted instances in mount order.
    pub fn instances(&self) -> &[InstanceId] {
        &self.order
    }

    /// Whether updates are queued and waiting for a flush.
    pub fn has_pending(&self) -> bool {
        runtime::pending_count() > 0
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        for id in self.order.drain(..) {
            runtime::remove_instance(id);
        }
    }
}

fn render_instance(id: InstanceId, view: &dyn View, render: u64) -> Result<Node, SlotError> {
    runtime::begin_render(id)?;
    let cx = ViewContext::new(id, render);
    let tree = view.render(&cx)?;
    runtime::finish_render(id)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{batch, StateCell};
    use crate::view::Element;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    type Probe<T> = Rc<Cell<Option<StateCell<T>>>>;

    fn probe<T: 'static>() -> Probe<T> {
        Rc::new(Cell::new(None))
    }

    fn counter(out: Probe<i64>) -> impl View {
        move |cx: &ViewContext| -> Result<Node, SlotError> {
            let count = cx.create_state(0i64)?;
            out.set(Some(count));
            Ok(Element::new("div")
                .child(Element::new("p").with_key("value").child(count.read().to_string()))
                .child(
                    Element::new("button")
                        .with_key("inc")
                        .on_click(move || count.update(|c| c + 1)),
                )
                .child(Element::new("button").with_key("twice").on_click(move || {
                    count.update(|c| c + 1);
                    count.update(|c| c + 1);
                }))
                .child(Element::new("button").with_key("noop").on_click(|| {}))
                .into())
        }
    }

    fn value_text(host: &Host, id: InstanceId) -> String {
        host.tree(id).unwrap().find("value").unwrap().text_content()
    }

    // ── Mount / unmount ──────────────────────────────────────────────

    #[test]
    fn mount_renders_once() {
        let mut host = Host::new();
        let id = host.mount(counter(probe())).unwrap();
        assert_eq!(host.render_count(id), Some(1));
        assert_eq!(value_text(&host, id), "0");
        assert_eq!(host.instances(), [id]);
    }

    #[test]
    fn failed_mount_leaves_nothing_behind() {
        let mut host = Host::new();
        let seen = Rc::new(Cell::new(None));
        let seen_c = seen.clone();
        let err = host
            .mount(move |cx: &ViewContext| -> Result<Node, SlotError> {
                seen_c.set(Some(cx.instance()));
                Err(SlotError::Unmounted {
                    instance: cx.instance(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, HostError::Slot(SlotError::Unmounted { .. })));
        assert_eq!(host.instance_count(), 0);
        assert!(!runtime::is_live(seen.get().unwrap()));
    }

    #[test]
    fn unmount_twice() {
        let mut host = Host::new();
        let id = host.mount(counter(probe())).unwrap();
        assert!(host.unmount(id));
        assert!(!host.unmount(id));
        assert!(!host.is_mounted(id));
        assert!(host.tree(id).is_none());
    }

    #[test]
    fn drop_unmounts_everything() {
        let mut host = Host::new();
        let id = host.mount(counter(probe())).unwrap();
        drop(host);
        assert!(!runtime::is_live(id));
    }

    // ── Update semantics ─────────────────────────────────────────────

    #[test]
    fn three_increments_from_zero() {
        let mut host = Host::new();
        let out = probe();
        let id = host.mount(counter(out.clone())).unwrap();
        let count = out.get().unwrap();

        host.batch(|| {
            count.update(|c| c + 1);
            count.update(|c| c + 1);
            count.update(|c| c + 1);
        })
        .unwrap();

        assert_eq!(count.read(), 3);
        assert_eq!(value_text(&host, id), "3");
        assert_eq!(host.render_count(id), Some(2));
    }

    #[test]
    fn mixed_forms_apply_in_call_order() {
        let mut host = Host::new();
        let out = probe();
        host.mount(counter(out.clone())).unwrap();
        let count = out.get().unwrap();

        count.set(5);
        count.update(|c| c + 1);
        count.update(|c| c * 2);
        let report = host.flush().unwrap();

        assert_eq!(count.read(), 12);
        assert_eq!(report.applied, 3);
        assert_eq!(report.passes, 1);
    }

    #[test]
    fn function_form_sees_applied_value_not_captured_one() {
        let mut host = Host::new();
        let out = probe();
        host.mount(counter(out.clone())).unwrap();
        let count = out.get().unwrap();

        // Both closures captured the same stale read.
        let stale = count.read();
        count.set(stale + 1);
        count.set(stale + 1);
        host.flush().unwrap();
        assert_eq!(count.read(), 1);

        count.update(|c| c + 1);
        count.update(|c| c + 1);
        host.flush().unwrap();
        assert_eq!(count.read(), 3);
    }

    #[test]
    fn generation_strictly_increases() {
        let mut host = Host::new();
        let out = probe();
        host.mount(counter(out.clone())).unwrap();
        let count = out.get().unwrap();

        let mut last = count.generation();
        for step in 0..3 {
            count.set(step);
            host.flush().unwrap();
            let now = count.generation();
            assert!(now > last);
            last = now;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn equal_value_still_rerenders() {
        let mut host = Host::new();
        let out = probe();
        let id = host.mount(counter(out.clone())).unwrap();
        out.get().unwrap().set(0);
        let report = host.flush().unwrap();
        assert_eq!(report.rerendered, vec![id]);
        assert_eq!(host.render_count(id), Some(2));
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Person {
        name: Option<String>,
        age: Option<u32>,
    }

    #[test]
    fn composite_value_is_replaced_not_merged() {
        let mut host = Host::new();
        let out: Probe<Person> = probe();
        let out_c = out.clone();
        host.mount(move |cx: &ViewContext| -> Result<Node, SlotError> {
            out_c.set(Some(cx.create_state(Person::default())?));
            Ok(Node::text(""))
        })
        .unwrap();
        let person = out.get().unwrap();

        person.set(Person {
            name: Some("Ada".into()),
            age: Some(36),
        });
        host.flush().unwrap();
        person.set(Person {
            name: None,
            age: Some(37),
        });
        host.flush().unwrap();

        assert_eq!(
            person.read(),
            Person {
                name: None,
                age: Some(37)
            }
        );
    }

    // ── Batching ─────────────────────────────────────────────────────

    #[test]
    fn dispatch_renders_once_per_turn() {
        let mut host = Host::new();
        let out = probe();
        let id = host.mount(counter(out.clone())).unwrap();

        assert!(host.dispatch(id, "twice", UiEvent::Click).unwrap());

        assert_eq!(out.get().unwrap().read(), 2);
        assert_eq!(value_text(&host, id), "2");
        assert_eq!(host.render_count(id), Some(2));
    }

    #[test]
    fn two_cells_one_render() {
        let mut host = Host::new();
        let cells: Rc<Cell<Option<(StateCell<i32>, StateCell<bool>)>>> = Rc::new(Cell::new(None));
        let cells_c = cells.clone();
        let id = host
            .mount(move |cx: &ViewContext| -> Result<Node, SlotError> {
                let a = cx.create_state(0i32)?;
                let b = cx.create_state(false)?;
                cells_c.set(Some((a, b)));
                Ok(Node::text(format!("{} {}", a.read(), b.read())))
            })
            .unwrap();
        let (a, b) = cells.get().unwrap();

        host.batch(|| {
            a.set(9);
            b.set(true);
        })
        .unwrap();

        assert_eq!(host.tree(id).unwrap().text_content(), "9 true");
        assert_eq!(host.render_count(id), Some(2));
    }

    #[test]
    fn flush_inside_batch_is_deferred() {
        let mut host = Host::new();
        let out = probe();
        let id = host.mount(counter(out.clone())).unwrap();
        let count = out.get().unwrap();

        let inner = batch(|| {
            count.set(4);
            host.flush().unwrap()
        });
        assert_eq!(inner, FlushReport::default());
        assert!(host.has_pending());

        let report = host.flush().unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.renders_of(id), 1);
        assert_eq!(count.read(), 4);
    }

    #[test]
    fn each_instance_renders_once() {
        let mut host = Host::new();
        let (out_a, out_b) = (probe(), probe());
        let a = host.mount(counter(out_a.clone())).unwrap();
        let b = host.mount(counter(out_b.clone())).unwrap();
        let (ca, cb) = (out_a.get().unwrap(), out_b.get().unwrap());

        ca.set(1);
        cb.set(1);
        ca.set(2);
        let report = host.flush().unwrap();

        assert_eq!(report.rerendered, vec![a, b]);
        assert_eq!(value_text(&host, a), "2");
        assert_eq!(value_text(&host, b), "1");
    }

    #[test]
    fn handler_without_replace_does_not_render() {
        let mut host = Host::new();
        let id = host.mount(counter(probe())).unwrap();
        assert!(host.dispatch(id, "noop", UiEvent::Click).unwrap());
        assert_eq!(host.render_count(id), Some(1));
    }

    #[test]
    fn dispatch_to_missing_target_or_kind() {
        let mut host = Host::new();
        let id = host.mount(counter(probe())).unwrap();
        assert!(!host.dispatch(id, "nope", UiEvent::Click).unwrap());
        assert!(!host.dispatch(id, "inc", UiEvent::Submit).unwrap());
        assert_eq!(host.render_count(id), Some(1));
    }

    #[test]
    fn dispatch_to_unknown_instance() {
        let mut host = Host::new();
        let id = host.mount(counter(probe())).unwrap();
        host.unmount(id);
        assert_eq!(
            host.dispatch(id, "inc", UiEvent::Click),
            Err(HostError::UnknownInstance(id))
        );
    }

    // ── Unmount discards ─────────────────────────────────────────────

    #[test]
    fn queued_updates_for_unmounted_instance_are_discarded() {
        let mut host = Host::new();
        let out = probe();
        let id = host.mount(counter(out.clone())).unwrap();
        out.get().unwrap().set(5);
        host.unmount(id);

        let report = host.flush().unwrap();
        assert_eq!(report.applied, 0);
        assert!(report.rerendered.is_empty());
        assert!(!host.has_pending());
    }

    // ── Slot faults ──────────────────────────────────────────────────

    /// Slot 0 is a trigger; slot 1 depends on `mode`:
    /// 0 = i32, 1 = String, 2 = absent, 3 = i32 plus an extra bool.
    fn shifting(mode: Rc<Cell<u8>>, out: Probe<u8>) -> impl View {
        move |cx: &ViewContext| -> Result<Node, SlotError> {
            out.set(Some(cx.create_state(0u8)?));
            match mode.get() {
                0 => {
                    cx.create_state(0i32)?;
                }
                1 => {
                    cx.create_state(String::new())?;
                }
                2 => {}
                _ => {
                    cx.create_state(0i32)?;
                    cx.create_state(false)?;
                }
            }
            Ok(Node::text(""))
        }
    }

    fn shift_to(target: u8) -> HostError {
        let mut host = Host::new();
        let mode = Rc::new(Cell::new(0));
        let out = probe();
        host.mount(shifting(mode.clone(), out.clone())).unwrap();
        mode.set(target);
        out.get().unwrap().set(1);
        host.flush().unwrap_err()
    }

    #[test]
    fn misaligned_type_is_reported() {
        match shift_to(1) {
            HostError::Slot(SlotError::Misaligned {
                slot,
                expected,
                found,
                ..
            }) => {
                assert_eq!(slot, 1);
                assert_eq!(expected, "i32");
                assert!(found.ends_with("String"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_slot_is_reported() {
        assert!(matches!(
            shift_to(2),
            HostError::Slot(SlotError::MissingSlots {
                declared: 1,
                sealed: 2,
                ..
            })
        ));
    }

    #[test]
    fn extra_slot_is_reported() {
        assert!(matches!(
            shift_to(3),
            HostError::Slot(SlotError::ExtraSlot {
                slot: 2,
                sealed: 2,
                ..
            })
        ));
    }

    #[test]
    fn failed_rerender_keeps_previous_tree() {
        let mut host = Host::new();
        let mode = Rc::new(Cell::new(0));
        let out = probe();
        let id = host.mount(shifting(mode.clone(), out.clone())).unwrap();
        mode.set(1);
        out.get().unwrap().set(1);
        assert!(host.flush().is_err());
        assert_eq!(host.render_count(id), Some(1));
        assert!(host.tree(id).is_some());
    }

    #[test]
    fn failed_rerender_does_not_skip_other_instances() {
        let mut host = Host::new();
        let mode = Rc::new(Cell::new(0));
        let (out_a, out_b) = (probe(), probe());
        let a = host.mount(shifting(mode.clone(), out_a.clone())).unwrap();
        let b = host.mount(counter(out_b.clone())).unwrap();

        mode.set(1);
        out_a.get().unwrap().set(1);
        out_b.get().unwrap().set(7);
        assert!(matches!(
            host.flush(),
            Err(HostError::Slot(SlotError::Misaligned { .. }))
        ));

        assert_eq!(value_text(&host, b), "7");
        assert_eq!(host.render_count(b), Some(2));
        assert_eq!(host.render_count(a), Some(1));
        assert!(host.flush().unwrap().is_empty());
    }

    #[test]
    fn panicking_update_leaves_cell_readable() {
        let mut host = Host::new();
        let out = probe();
        let id = host.mount(counter(out.clone())).unwrap();
        let count = out.get().unwrap();
        count.set(4);
        host.flush().unwrap();

        count.update(|_| -> i64 { panic!("boom") });
        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| host.flush()));
        assert!(unwound.is_err());
        assert_eq!(count.try_read(), Ok(4));

        count.update(|c| c + 1);
        host.flush().unwrap();
        assert_eq!(value_text(&host, id), "5");
    }

    // ── Update loops ─────────────────────────────────────────────────

    #[test]
    fn self_replacing_view_hits_pass_limit() {
        let mut host = Host::with_config(HostConfig::new().with_max_flush_passes(3));
        host.mount(|cx: &ViewContext| -> Result<Node, SlotError> {
            let n = cx.create_state(0u32)?;
            n.update(|v| v + 1);
            Ok(Node::text(""))
        })
        .unwrap();
        assert!(host.has_pending());
        assert_eq!(host.flush(), Err(HostError::UpdateLoop { passes: 3 }));
    }

    #[test]
    fn render_that_settles_runs_extra_pass() {
        let mut host = Host::new();
        let out = probe();
        let out_c = out.clone();
        let id = host
            .mount(move |cx: &ViewContext| -> Result<Node, SlotError> {
                let n = cx.create_state(0i64)?;
                out_c.set(Some(n));
                // Clamp into range on the render after an out-of-range write.
                if n.read() > 10 {
                    n.set(10);
                }
                Ok(Node::text(n.read().to_string()))
            })
            .unwrap();
        out.get().unwrap().set(99);
        let report = host.flush().unwrap();
        assert_eq!(report.passes, 2);
        assert_eq!(report.renders_of(id), 2);
        assert_eq!(host.tree(id).unwrap().text_content(), "10");
    }
}
