use super::kind::{slots, NodeKind, PIPELINE_TYPE};
use super::provider::{Phase, RuntimeMappingProvider};
use super::snapshot::{CounterpartMaps, NameMap, PipelineSnapshot};
use crate::model::{ConfigurationModel, NodeId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Which descriptor pair a correlating traversal reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterpart {
    Source,
    Sink,
}

/// Builds and caches [`PipelineSnapshot`]s for one configuration model.
///
/// Inventories each pipeline with a single traversal from its `sources`,
/// then correlates design-time elements with their runtime counterparts by
/// logical name. Every correlated runtime node is remembered together with
/// the design-time node it was derived from; the codec consults this mapping
/// when naming nodes.
pub struct TopologyMapper {
    provider: Arc<dyn RuntimeMappingProvider>,
    phase_order: Vec<Phase>,
    snapshots: RwLock<HashMap<String, Option<Arc<PipelineSnapshot>>>>,
    /// Runtime node → design-time original.
    mapped: RwLock<HashMap<NodeId, NodeId>>,
    owners: OnceLock<HashMap<NodeId, NodeId>>,
    traversals: AtomicUsize,
}

impl TopologyMapper {
    pub fn new(provider: Arc<dyn RuntimeMappingProvider>, phase_order: Vec<Phase>) -> Self {
        Self {
            provider,
            phase_order,
            snapshots: RwLock::new(HashMap::new()),
            mapped: RwLock::new(HashMap::new()),
            owners: OnceLock::new(),
            traversals: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the pipeline whose logical name is `pipeline_name`.
    ///
    /// Built on first lookup and cached afterwards, including the negative
    /// result for names that do not denote a pipeline. When runtime clones of
    /// the pipeline share its name, the design-time pipeline is used.
    pub fn snapshot(
        &self,
        model: &ConfigurationModel,
        pipeline_name: &str,
    ) -> Option<Arc<PipelineSnapshot>> {
        if let Some(cached) = self
            .snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pipeline_name)
        {
            return cached.clone();
        }

        let built = self
            .find_pipeline(model, pipeline_name)
            .map(|p| Arc::new(self.build_snapshot(model, p)));
        if built.is_none() {
            tracing::debug!("No pipeline named '{}' in the model", pipeline_name);
        }

        // Another thread may have won the race; keep whichever landed first.
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(pipeline_name.to_string())
            .or_insert(built)
            .clone()
    }

    /// Number of snapshot traversals performed so far.
    pub fn traversal_count(&self) -> usize {
        self.traversals.load(Ordering::Relaxed)
    }

    /// Algorithm name → runtime algorithm node for a snapshot.
    pub fn algorithms<'s>(
        &self,
        model: &ConfigurationModel,
        snapshot: &'s PipelineSnapshot,
    ) -> &'s NameMap {
        snapshot
            .algorithms
            .get_or_init(|| self.gather_algorithms(model, snapshot))
    }

    /// Source descriptor name → runtime source descriptor.
    pub fn runtime_sources<'s>(
        &self,
        model: &ConfigurationModel,
        snapshot: &'s PipelineSnapshot,
    ) -> &'s NameMap {
        &self.counterparts(model, snapshot).sources
    }

    /// Sink descriptor name → runtime sink descriptor (replay sinks included).
    pub fn runtime_sinks<'s>(
        &self,
        model: &ConfigurationModel,
        snapshot: &'s PipelineSnapshot,
    ) -> &'s NameMap {
        &self.counterparts(model, snapshot).sinks
    }

    /// Runtime counterpart of the algorithm `algorithm` used in `pipeline`.
    pub fn algorithm(
        &self,
        model: &ConfigurationModel,
        pipeline: &str,
        algorithm: &str,
    ) -> Option<NodeId> {
        let snapshot = self.snapshot(model, pipeline)?;
        self.algorithms(model, &snapshot).get(algorithm).copied()
    }

    /// Whether `node` is a known runtime counterpart.
    pub fn is_mapped(&self, node: NodeId) -> bool {
        self.original_of(node).is_some()
    }

    /// Design-time node the runtime counterpart `node` was derived from.
    pub fn original_of(&self, node: NodeId) -> Option<NodeId> {
        self.mapped
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&node)
            .copied()
    }

    /// Snapshot every pipeline of the model and build all name maps.
    pub fn warm_up(&self, model: &ConfigurationModel) {
        let names: Vec<String> = model
            .of_type(PIPELINE_TYPE)
            .map(|p| p.logical_name().to_string())
            .collect();
        for name in names {
            if let Some(snapshot) = self.snapshot(model, &name) {
                self.algorithms(model, &snapshot);
                self.counterparts(model, &snapshot);
            }
        }
    }

    /// The pipeline declaring `node`, found by climbing to its top-level
    /// owner. A pipeline does not enclose itself.
    pub fn enclosing_pipeline(&self, model: &ConfigurationModel, node: NodeId) -> Option<NodeId> {
        let top = model.top_level_owner(node)?;
        let owner = model.get(top)?;
        if owner.type_name == PIPELINE_TYPE {
            return (top != node).then_some(top);
        }
        self.owners
            .get_or_init(|| self.collect_owners(model))
            .get(&top)
            .copied()
    }

    fn collect_owners(&self, model: &ConfigurationModel) -> HashMap<NodeId, NodeId> {
        let mut owners = HashMap::new();
        let names: Vec<String> = model
            .of_type(PIPELINE_TYPE)
            .map(|p| p.logical_name().to_string())
            .collect();
        for name in names {
            let Some(snapshot) = self.snapshot(model, &name) else {
                continue;
            };
            for element in snapshot.elements() {
                owners.entry(element).or_insert(snapshot.pipeline);
            }
            for &element in &snapshot.family_elements {
                for algorithm in family_members(model, element) {
                    owners.entry(algorithm).or_insert(snapshot.pipeline);
                }
            }
        }
        owners
    }

    fn find_pipeline(&self, model: &ConfigurationModel, name: &str) -> Option<NodeId> {
        let candidates: Vec<NodeId> = model
            .of_type(PIPELINE_TYPE)
            .filter(|p| p.logical_name() == name)
            .map(|p| p.id)
            .collect();
        if candidates.len() <= 1 {
            return candidates.first().copied();
        }

        let clones = self.runtime_pipelines(model, name, &candidates);
        let Some(design) = candidates.iter().copied().find(|c| !clones.contains(c)) else {
            tracing::warn!(
                "Every pipeline named '{}' holds runtime clones; using the first",
                name
            );
            return candidates.first().copied();
        };
        tracing::debug!(
            "Pipeline '{}' is {:?}; {} same-named runtime clones",
            name,
            design,
            clones.len()
        );
        self.mark_mapped(clones.into_iter().map(|c| (c, design)).collect());
        Some(design)
    }

    /// Candidates holding a runtime clone of a family element reached from
    /// another candidate, by traversal or by containment.
    fn runtime_pipelines(
        &self,
        model: &ConfigurationModel,
        name: &str,
        candidates: &[NodeId],
    ) -> HashSet<NodeId> {
        let reached: Vec<PipelineSnapshot> = candidates
            .iter()
            .map(|&pipeline| {
                let mut traversal =
                    Traversal::new(model, PipelineSnapshot::new(pipeline, name.to_string()), None);
                traversal.run(pipeline);
                traversal.snapshot
            })
            .collect();

        let mut clones = HashSet::new();
        for (i, snapshot) in reached.iter().enumerate() {
            for &element in &snapshot.family_elements {
                let runtime = self
                    .phase_order
                    .iter()
                    .filter_map(|&phase| self.provider.mapped_nodes(element, phase))
                    .flatten();
                for node in runtime {
                    let owner = model.top_level_owner(node);
                    for (j, other) in reached.iter().enumerate() {
                        if j != i && (other.contains(node) || owner == Some(other.pipeline)) {
                            clones.insert(other.pipeline);
                        }
                    }
                }
            }
        }
        clones
    }

    fn build_snapshot(&self, model: &ConfigurationModel, pipeline: NodeId) -> PipelineSnapshot {
        self.traversals.fetch_add(1, Ordering::Relaxed);
        let name = model.logical_name(pipeline).unwrap_or_default().to_string();
        let mut traversal = Traversal::new(model, PipelineSnapshot::new(pipeline, name), None);
        traversal.run(pipeline);
        let snapshot = traversal.snapshot;
        tracing::debug!(
            "Pipeline '{}': {} sources, {} family elements, {} data management elements, {} sinks, {} replay sinks",
            snapshot.name,
            snapshot.sources.len(),
            snapshot.family_elements.len(),
            snapshot.data_management_elements.len(),
            snapshot.sinks.len(),
            snapshot.replay_sinks.len()
        );
        snapshot
    }

    fn counterparts<'s>(
        &self,
        model: &ConfigurationModel,
        snapshot: &'s PipelineSnapshot,
    ) -> &'s CounterpartMaps {
        snapshot.counterparts.get_or_init(|| {
            let mut maps = CounterpartMaps::default();
            let mut runtime_nodes = Vec::new();
            let mut on_pair = |kind: Counterpart, original: NodeId, runtime: NodeId| {
                let Some(name) = model.logical_name(original) else {
                    return;
                };
                let map = match kind {
                    Counterpart::Source => &mut maps.sources,
                    Counterpart::Sink => &mut maps.sinks,
                };
                map.entry(name.to_string()).or_insert(runtime);
                runtime_nodes.push((runtime, original));
            };
            let callback: PairCallback<'_> = &mut on_pair;
            let mut traversal = Traversal::new(
                model,
                PipelineSnapshot::new(snapshot.pipeline, snapshot.name.clone()),
                Some(callback),
            );
            traversal.run(snapshot.pipeline);
            drop(traversal);

            self.mark_mapped(runtime_nodes);
            maps
        })
    }

    fn gather_algorithms(&self, model: &ConfigurationModel, snapshot: &PipelineSnapshot) -> NameMap {
        let mut algorithms = NameMap::new();
        let mut runtime_nodes = Vec::new();
        let mut phase = None;

        for &element in &snapshot.family_elements {
            let Some(clones) = self.runtime_clones(element, &mut phase) else {
                tracing::debug!(
                    "No runtime mapping yet for family element {:?} of '{}'",
                    element,
                    snapshot.name
                );
                continue;
            };
            runtime_nodes.extend(clones.iter().map(|&clone| (clone, element)));
            let mut candidates: Vec<NodeId> = clones
                .iter()
                .filter_map(|c| model.get(*c))
                .flat_map(|c| c.refs(slots::AVAILABLE))
                .collect();

            for algorithm in family_members(model, element) {
                let Some(name) = model.logical_name(algorithm) else {
                    continue;
                };
                let matched = candidates
                    .iter()
                    .position(|c| model.logical_name(*c) == Some(name));
                if let Some(pos) = matched {
                    // Consume the candidate so a second same-named member cannot claim it.
                    let runtime = candidates.remove(pos);
                    algorithms.entry(name.to_string()).or_insert(runtime);
                    runtime_nodes.push((runtime, algorithm));
                }
            }
        }

        self.mark_mapped(runtime_nodes);
        algorithms
    }

    /// Runtime clones of `element`, trying phases in order until one has a
    /// mapping; the winning phase is then reused for the rest of the build.
    fn runtime_clones(&self, element: NodeId, phase: &mut Option<Phase>) -> Option<Vec<NodeId>> {
        if let Some(phase) = *phase {
            return self.provider.mapped_nodes(element, phase);
        }
        for &candidate in &self.phase_order {
            if let Some(nodes) = self.provider.mapped_nodes(element, candidate) {
                *phase = Some(candidate);
                return Some(nodes);
            }
        }
        None
    }

    /// Remember `(runtime, original)` pairs; the first original recorded for
    /// a runtime node wins.
    fn mark_mapped(&self, pairs: Vec<(NodeId, NodeId)>) {
        if pairs.is_empty() {
            return;
        }
        let mut mapped = self.mapped.write().unwrap_or_else(PoisonError::into_inner);
        for (runtime, original) in pairs {
            mapped.entry(runtime).or_insert(original);
        }
    }
}

impl std::fmt::Debug for TopologyMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyMapper")
            .field("phase_order", &self.phase_order)
            .field("traversals", &self.traversal_count())
            .finish()
    }
}

/// Algorithms listed in `family.members` of a family element.
fn family_members(model: &ConfigurationModel, element: NodeId) -> Vec<NodeId> {
    let Some(node) = model.get(element) else {
        return Vec::new();
    };
    node.refs(slots::FAMILY)
        .into_iter()
        .filter_map(|family| model.get(family))
        .flat_map(|family| family.refs(slots::MEMBERS))
        .collect()
}

/// Pair original descriptors with runtime `available` entries by index.
///
/// Equal sizes zip; a single runtime entry pairs with every original; a single
/// original pairs with the first runtime entry. Other size mismatches yield
/// nothing.
pub(crate) fn correlate(originals: &[NodeId], available: &[NodeId]) -> Vec<(NodeId, NodeId)> {
    if originals.len() == available.len() {
        originals.iter().copied().zip(available.iter().copied()).collect()
    } else if available.len() == 1 {
        originals.iter().map(|&o| (o, available[0])).collect()
    } else if originals.len() == 1 && !available.is_empty() {
        vec![(originals[0], available[0])]
    } else {
        Vec::new()
    }
}

type PairCallback<'c> = &'c mut dyn FnMut(Counterpart, NodeId, NodeId);

/// One depth-first walk over a pipeline graph.
struct Traversal<'a, 'c> {
    model: &'a ConfigurationModel,
    snapshot: PipelineSnapshot,
    visited: HashSet<NodeId>,
    on_pair: Option<PairCallback<'c>>,
}

impl<'a, 'c> Traversal<'a, 'c> {
    fn new(
        model: &'a ConfigurationModel,
        snapshot: PipelineSnapshot,
        on_pair: Option<PairCallback<'c>>,
    ) -> Self {
        Self {
            model,
            snapshot,
            visited: HashSet::new(),
            on_pair,
        }
    }

    fn run(&mut self, pipeline: NodeId) {
        let sources = self.follow(pipeline, slots::SOURCES);
        let mut stack: Vec<NodeId> = sources.into_iter().rev().collect();

        while let Some(id) = stack.pop() {
            // Converging flows reach the same element more than once.
            if !self.visited.insert(id) {
                continue;
            }
            let next = self.visit(id);
            stack.extend(next.into_iter().rev());
        }
    }

    /// Record `id` and return the nodes to continue with.
    fn visit(&mut self, id: NodeId) -> Vec<NodeId> {
        let model = self.model;
        let Some(node) = model.get(id) else {
            tracing::debug!("Dangling reference {:?} in pipeline '{}'", id, self.snapshot.name);
            return Vec::new();
        };

        let kind = NodeKind::of(&node.type_name);
        if kind.is_recorded() {
            self.snapshot.record(kind, id);
        }
        match kind {
            NodeKind::Source => self.correlate(id, slots::SOURCE, Counterpart::Source),
            NodeKind::Sink | NodeKind::ReplaySink => {
                self.correlate(id, slots::SINK, Counterpart::Sink)
            }
            NodeKind::FamilyElement if node.slot(slots::FAMILY).is_none() => {
                tracing::debug!("Family element '{}' has no family", node.decl_name);
            }
            _ => {}
        }
        if kind.is_terminal() {
            return Vec::new();
        }

        match kind {
            NodeKind::Source if node.slot(slots::OUTPUT).is_none() && node.slot(slots::NEXT).is_some() => {
                self.follow(id, slots::NEXT)
            }
            NodeKind::Flow => self.follow(id, slots::DESTINATION),
            _ => self.follow(id, slots::OUTPUT),
        }
    }

    fn follow(&self, id: NodeId, slot: &str) -> Vec<NodeId> {
        match self.model.get(id).and_then(|n| n.slot(slot)) {
            Some(s) => s.refs(),
            None => {
                tracing::debug!(
                    "Skipping missing slot '{}' on {:?} in pipeline '{}'",
                    slot,
                    id,
                    self.snapshot.name
                );
                Vec::new()
            }
        }
    }

    fn correlate(&mut self, id: NodeId, descriptor_slot: &str, kind: Counterpart) {
        let Some(callback) = self.on_pair.as_mut() else {
            return;
        };
        let Some(node) = self.model.get(id) else {
            return;
        };
        let originals = node.refs(descriptor_slot);
        let available = node.refs(slots::AVAILABLE);
        for (original, runtime) in correlate(&originals, &available) {
            callback(kind, original, runtime);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Slot, Value};
    use crate::topology::provider::{MockRuntimeMappingProvider, StaticMappingProvider};
    use mockall::predicate::eq;

    fn named(model: &mut ConfigurationModel, ty: &str, decl: &str, name: &str) -> NodeId {
        let id = model.add_node(ty, decl, None).unwrap();
        model
            .set_slot(id, "name", Slot::value(Value::Text(name.into())))
            .unwrap();
        id
    }

    /// pip: src -> flow -> fam(A, B) -> flow2 -> sink
    struct Fixture {
        model: ConfigurationModel,
        src: NodeId,
        fam_element: NodeId,
        sink: NodeId,
        alg_a: NodeId,
        alg_b: NodeId,
    }

    fn fixture() -> Fixture {
        let mut model = ConfigurationModel::new();
        let pip = named(&mut model, "Pipeline", "pip", "PriorityPip");
        let src = named(&mut model, "Source", "src", "Spring");
        let flow = named(&mut model, "Flow", "f1", "f1");
        let fam_element = named(&mut model, "FamilyElement", "fe", "Processor");
        let flow2 = named(&mut model, "Flow", "f2", "f2");
        let sink = named(&mut model, "Sink", "snk", "Out");
        let family = named(&mut model, "Family", "family", "fCorrelation");
        let alg_a = named(&mut model, "Algorithm", "algA", "A");
        let alg_b = named(&mut model, "Algorithm", "algB", "B");

        model.set_slot(pip, "sources", Slot::List(vec![src])).unwrap();
        model.set_slot(src, "output", Slot::List(vec![flow])).unwrap();
        model.set_slot(flow, "destination", Slot::Ref(fam_element)).unwrap();
        model.set_slot(fam_element, "family", Slot::Ref(family)).unwrap();
        model.set_slot(fam_element, "output", Slot::List(vec![flow2])).unwrap();
        model.set_slot(flow2, "destination", Slot::Ref(sink)).unwrap();
        model.set_slot(family, "members", Slot::List(vec![alg_a, alg_b])).unwrap();

        Fixture {
            model,
            src,
            fam_element,
            sink,
            alg_a,
            alg_b,
        }
    }

    fn mapper(provider: impl RuntimeMappingProvider + 'static) -> TopologyMapper {
        TopologyMapper::new(Arc::new(provider), Phase::default_order())
    }

    #[test]
    fn test_snapshot_inventory() {
        let f = fixture();
        let mapper = mapper(StaticMappingProvider::new());
        let snapshot = mapper.snapshot(&f.model, "PriorityPip").unwrap();

        assert_eq!(snapshot.sources, vec![f.src]);
        assert_eq!(snapshot.family_elements, vec![f.fam_element]);
        assert_eq!(snapshot.sinks, vec![f.sink]);
        assert!(snapshot.data_management_elements.is_empty());
    }

    #[test]
    fn test_snapshot_is_cached() {
        let f = fixture();
        let mapper = mapper(StaticMappingProvider::new());
        let first = mapper.snapshot(&f.model, "PriorityPip").unwrap();
        let second = mapper.snapshot(&f.model, "PriorityPip").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(mapper.traversal_count(), 1);
    }

    #[test]
    fn test_unknown_pipeline_is_absent_and_cached() {
        let f = fixture();
        let mapper = mapper(StaticMappingProvider::new());
        assert!(mapper.snapshot(&f.model, "Nope").is_none());
        assert!(mapper.snapshot(&f.model, "Nope").is_none());
        assert_eq!(mapper.traversal_count(), 0);
    }

    #[test]
    fn test_algorithm_matching_consumes_candidates() {
        let mut f = fixture();
        let fe_rt = named(&mut f.model, "FamilyElement", "fe_rt", "Processor");
        let a_rt = named(&mut f.model, "Algorithm", "algA_rt", "A");
        let a_rt2 = named(&mut f.model, "Algorithm", "algA_rt2", "A");
        f.model
            .set_slot(fe_rt, "available", Slot::List(vec![a_rt, a_rt2]))
            .unwrap();

        let provider =
            StaticMappingProvider::new().with(f.fam_element, Phase::Monitoring, vec![fe_rt]);
        let mapper = mapper(provider);
        let snapshot = mapper.snapshot(&f.model, "PriorityPip").unwrap();
        let algorithms = mapper.algorithms(&f.model, &snapshot);

        assert_eq!(algorithms.len(), 1);
        assert_eq!(algorithms.get("A"), Some(&a_rt));
        assert!(!algorithms.contains_key("B"));
        assert!(mapper.is_mapped(a_rt));
        assert!(!mapper.is_mapped(a_rt2));
        assert!(!mapper.is_mapped(f.alg_a));
    }

    #[test]
    fn test_phase_fallback_then_reuse() {
        let f = fixture();
        let mut provider = MockRuntimeMappingProvider::new();
        provider
            .expect_mapped_nodes()
            .with(eq(f.fam_element), eq(Phase::Adaptation))
            .times(1)
            .returning(|_, _| None);
        provider
            .expect_mapped_nodes()
            .with(eq(f.fam_element), eq(Phase::Monitoring))
            .times(1)
            .returning(|_, _| Some(Vec::new()));

        let mapper = mapper(provider);
        let snapshot = mapper.snapshot(&f.model, "PriorityPip").unwrap();
        assert!(mapper.algorithms(&f.model, &snapshot).is_empty());
        // Second access reads the initialized map without consulting the provider.
        assert!(mapper.algorithms(&f.model, &snapshot).is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut f = fixture();
        // The sink-side flow loops back into the family element instead.
        let back = named(&mut f.model, "Flow", "back", "back");
        f.model.set_slot(back, "destination", Slot::Ref(f.src)).unwrap();
        f.model
            .set_slot(f.fam_element, "output", Slot::List(vec![back]))
            .unwrap();

        let mapper = mapper(StaticMappingProvider::new());
        let snapshot = mapper.snapshot(&f.model, "PriorityPip").unwrap();
        assert_eq!(snapshot.sources, vec![f.src]);
        assert_eq!(snapshot.family_elements, vec![f.fam_element]);
        assert!(snapshot.sinks.is_empty());
    }

    #[test]
    fn test_legacy_next_slot() {
        let mut model = ConfigurationModel::new();
        let pip = named(&mut model, "Pipeline", "pip", "Legacy");
        let src = named(&mut model, "Source", "src", "src");
        let dme = named(&mut model, "DataManagementElement", "dme", "store");
        model.set_slot(pip, "sources", Slot::Ref(src)).unwrap();
        model.set_slot(src, "next", Slot::Ref(dme)).unwrap();

        let mapper = mapper(StaticMappingProvider::new());
        let snapshot = mapper.snapshot(&model, "Legacy").unwrap();
        assert_eq!(snapshot.data_management_elements, vec![dme]);
    }

    #[test]
    fn test_source_and_sink_counterparts() {
        let mut f = fixture();
        let desc = named(&mut f.model, "DataSource", "springDesc", "SpringStream");
        let desc_rt = named(&mut f.model, "DataSource", "springDesc_rt", "SpringStream");
        let sink_desc = named(&mut f.model, "DataSink", "outDesc", "OutSink");
        let sink_rt = named(&mut f.model, "DataSink", "outDesc_rt", "OutSink");
        f.model.set_slot(f.src, "source", Slot::Ref(desc)).unwrap();
        f.model.set_slot(f.src, "available", Slot::List(vec![desc_rt])).unwrap();
        f.model.set_slot(f.sink, "sink", Slot::Ref(sink_desc)).unwrap();
        f.model.set_slot(f.sink, "available", Slot::List(vec![sink_rt])).unwrap();

        let mapper = mapper(StaticMappingProvider::new());
        let snapshot = mapper.snapshot(&f.model, "PriorityPip").unwrap();
        assert_eq!(mapper.runtime_sources(&f.model, &snapshot).get("SpringStream"), Some(&desc_rt));
        assert_eq!(mapper.runtime_sinks(&f.model, &snapshot).get("OutSink"), Some(&sink_rt));
        assert!(mapper.is_mapped(desc_rt));
        assert!(mapper.is_mapped(sink_rt));
    }

    #[test]
    fn test_replay_sink_recorded_terminal_and_correlated() {
        let mut f = fixture();
        let to_replay = named(&mut f.model, "Flow", "f3", "f3");
        let replay = named(&mut f.model, "ReplaySink", "rs", "Replay");
        let past = named(&mut f.model, "Flow", "f4", "f4");
        let beyond = named(&mut f.model, "Sink", "beyond", "Beyond");
        let store = named(&mut f.model, "DataSink", "store", "ReplayStore");
        let store_rt = named(&mut f.model, "DataSink", "store_rt", "ReplayStore");
        let flow2 = f.model.find_by_decl("f2").unwrap();
        f.model
            .set_slot(f.fam_element, "output", Slot::List(vec![flow2, to_replay]))
            .unwrap();
        f.model.set_slot(to_replay, "destination", Slot::Ref(replay)).unwrap();
        f.model.set_slot(replay, "output", Slot::List(vec![past])).unwrap();
        f.model.set_slot(past, "destination", Slot::Ref(beyond)).unwrap();
        f.model.set_slot(replay, "sink", Slot::Ref(store)).unwrap();
        f.model.set_slot(replay, "available", Slot::List(vec![store_rt])).unwrap();

        let mapper = mapper(StaticMappingProvider::new());
        let snapshot = mapper.snapshot(&f.model, "PriorityPip").unwrap();
        assert_eq!(snapshot.replay_sinks, vec![replay]);
        assert_eq!(snapshot.sinks, vec![f.sink]);
        assert!(!snapshot.contains(beyond));
        assert_eq!(mapper.runtime_sinks(&f.model, &snapshot).get("ReplayStore"), Some(&store_rt));
        assert_eq!(mapper.original_of(store_rt), Some(store));
    }

    #[test]
    fn test_same_named_runtime_pipeline_is_skipped() {
        let mut model = ConfigurationModel::new();
        // Runtime clone declared first, so arena order would pick it.
        let pip_rt = named(&mut model, "Pipeline", "pip_rt", "PriorityPip");
        let src_rt = named(&mut model, "Source", "src_rt", "Spring");
        let flow_rt = named(&mut model, "Flow", "f1_rt", "f1");
        let fe_rt = named(&mut model, "FamilyElement", "fe_rt", "Processor");
        let a_rt = named(&mut model, "Algorithm", "algA_rt", "A");
        model.set_slot(pip_rt, "sources", Slot::List(vec![src_rt])).unwrap();
        model.set_slot(src_rt, "output", Slot::List(vec![flow_rt])).unwrap();
        model.set_slot(flow_rt, "destination", Slot::Ref(fe_rt)).unwrap();
        model.set_slot(fe_rt, "available", Slot::List(vec![a_rt])).unwrap();

        let pip = named(&mut model, "Pipeline", "pip", "PriorityPip");
        let src = named(&mut model, "Source", "src", "Spring");
        let flow = named(&mut model, "Flow", "f1", "f1");
        let fe = named(&mut model, "FamilyElement", "fe", "Processor");
        let family = named(&mut model, "Family", "family", "fCorrelation");
        let alg_a = named(&mut model, "Algorithm", "algA", "A");
        model.set_slot(pip, "sources", Slot::List(vec![src])).unwrap();
        model.set_slot(src, "output", Slot::List(vec![flow])).unwrap();
        model.set_slot(flow, "destination", Slot::Ref(fe)).unwrap();
        model.set_slot(fe, "family", Slot::Ref(family)).unwrap();
        model.set_slot(family, "members", Slot::List(vec![alg_a])).unwrap();

        let mapper = mapper(StaticMappingProvider::new().with(fe, Phase::Monitoring, vec![fe_rt]));
        let snapshot = mapper.snapshot(&model, "PriorityPip").unwrap();
        assert_eq!(snapshot.pipeline, pip);
        assert_eq!(snapshot.family_elements, vec![fe]);
        assert_eq!(mapper.traversal_count(), 1);

        assert_eq!(mapper.algorithms(&model, &snapshot).get("A"), Some(&a_rt));
        assert_eq!(mapper.original_of(pip_rt), Some(pip));
        assert_eq!(mapper.original_of(fe_rt), Some(fe));
        assert_eq!(mapper.original_of(a_rt), Some(alg_a));
        assert_eq!(mapper.original_of(pip), None);
    }

    #[test]
    fn test_enclosing_pipeline() {
        let f = fixture();
        let mapper = mapper(StaticMappingProvider::new());
        let pip = f.model.find_by_decl("pip").unwrap();

        assert_eq!(mapper.enclosing_pipeline(&f.model, f.src), Some(pip));
        assert_eq!(mapper.enclosing_pipeline(&f.model, f.alg_b), Some(pip));
        assert_eq!(mapper.enclosing_pipeline(&f.model, pip), None);
    }

    #[test]
    fn test_correlate_rules() {
        let o = [NodeId(1), NodeId(2)];
        assert_eq!(
            correlate(&o, &[NodeId(10), NodeId(20)]),
            vec![(NodeId(1), NodeId(10)), (NodeId(2), NodeId(20))]
        );
        assert_eq!(
            correlate(&o, &[NodeId(10)]),
            vec![(NodeId(1), NodeId(10)), (NodeId(2), NodeId(10))]
        );
        assert_eq!(
            correlate(&[NodeId(1)], &[NodeId(10), NodeId(20), NodeId(30)]),
            vec![(NodeId(1), NodeId(10))]
        );
        assert!(correlate(&o, &[NodeId(10), NodeId(20), NodeId(30)]).is_empty());
        assert!(correlate(&o, &[]).is_empty());
    }
}
