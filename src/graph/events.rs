//! Change notifications emitted by a [`MutableGraph`](crate::MutableGraph).
use std::collections::BTreeSet;
use std::fmt::{self, Debug};

use tracing::trace;

use crate::{ComponentId, EdgeId, NodeId};

/// A change notification.
///
/// Within one transaction events arrive in this order: [`GraphEvent::GraphWillChange`],
/// the element events as the mutations happen, then on commit every
/// [`GraphEvent::ComponentsWillMerge`], every [`GraphEvent::ComponentWillBeRemoved`],
/// every [`GraphEvent::ComponentSplit`], every [`GraphEvent::ComponentAdded`] and
/// finally [`GraphEvent::GraphChanged`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    GraphWillChange,
    NodeAdded(NodeId),
    NodeWillBeRemoved(NodeId),
    EdgeAdded(EdgeId),
    EdgeWillBeRemoved(EdgeId),
    ComponentsWillMerge(ComponentMergeSet),
    /// `has_merged` is set when the component is absorbed by a merge.
    ComponentWillBeRemoved { id: ComponentId, has_merged: bool },
    ComponentSplit(ComponentSplitSet),
    /// `has_split` is set when the component split off an existing one.
    ComponentAdded { id: ComponentId, has_split: bool },
    /// `changed` is whether the transaction mutated the structure at all.
    GraphChanged { changed: bool },
}

/// Components that merge into a surviving one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMergeSet {
    merged: BTreeSet<ComponentId>,
    new_id: ComponentId,
}

impl ComponentMergeSet {
    pub(crate) fn new(merged: BTreeSet<ComponentId>, new_id: ComponentId) -> Self {
        debug_assert!(merged.contains(&new_id));
        Self { merged, new_id }
    }

    /// Every component taking part, including the survivor.
    pub fn merged(&self) -> &BTreeSet<ComponentId> {
        &self.merged
    }

    /// The surviving component.
    pub fn new_id(&self) -> ComponentId {
        self.new_id
    }

    /// Components that cease to exist.
    pub fn removes(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.merged.iter().copied().filter(move |id| *id != self.new_id)
    }
}

/// A component and the components it split into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSplitSet {
    old_id: ComponentId,
    splitters: BTreeSet<ComponentId>,
}

impl ComponentSplitSet {
    pub(crate) fn new(old_id: ComponentId, splitters: BTreeSet<ComponentId>) -> Self {
        debug_assert!(splitters.contains(&old_id));
        Self { old_id, splitters }
    }

    /// The component that split. It survives as one of the splitters.
    pub fn old_id(&self) -> ComponentId {
        self.old_id
    }

    /// Every resulting component, including `old_id`.
    pub fn splitters(&self) -> &BTreeSet<ComponentId> {
        &self.splitters
    }
}

/// Handle returned by [`MutableGraph::subscribe`](crate::MutableGraph::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GraphEvent) + Send>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn dispatch(&mut self, event: &GraphEvent) {
        trace!(?event, "dispatching graph event");
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn unsubscribed_listeners_stop_receiving() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut listeners = Listeners::default();

        let counter = count.clone();
        let id = listeners.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        listeners.dispatch(&GraphEvent::GraphWillChange);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.dispatch(&GraphEvent::GraphChanged { changed: false });

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn merge_set_removes_all_but_survivor() {
        let ids: Vec<_> = (0..3).map(ComponentId::new).collect();
        let merge = ComponentMergeSet::new(ids.iter().copied().collect(), ids[1]);
        assert!(merge.removes().eq([ids[0], ids[2]]));
        assert_eq!(merge.new_id(), ids[1]);
    }
}
