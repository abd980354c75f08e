//! Test data builders for pipeline models

use telebind_rs::model::{ConfigurationModel, NodeId, Slot, Value, ValueType};
use telebind_rs::topology::{Phase, StaticMappingProvider};

/// A built pipeline model and the ids tests need to address it
pub struct PipelineFixture {
    pub model: ConfigurationModel,
    pub provider: StaticMappingProvider,
    pub pipeline: NodeId,
    pub source: NodeId,
    pub family_element: NodeId,
    pub sink: NodeId,
    /// Design-time family members, in declaration order
    pub algorithms: Vec<NodeId>,
    /// Runtime clones listed in the runtime family element's `available`
    pub runtime_algorithms: Vec<NodeId>,
}

/// Builds `pipeline: source -> flow -> family element -> flow -> sink`,
/// with a family of algorithms and, optionally, a runtime clone of the
/// family element deploying some of them.
///
/// Every element and algorithm carries `latency` (real), `capacity`
/// (integer) and `isValid` (boolean) slots.
pub struct PipelineBuilder {
    name: String,
    source: String,
    family_element: String,
    sink: String,
    algorithms: Vec<String>,
    runtime: Vec<String>,
    phase: Phase,
}

impl PipelineBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: "Spring".to_string(),
            family_element: "Processor".to_string(),
            sink: "Out".to_string(),
            algorithms: vec!["A".to_string(), "B".to_string()],
            runtime: vec!["A".to_string()],
            phase: Phase::Monitoring,
        }
    }

    pub fn elements(mut self, source: &str, family_element: &str, sink: &str) -> Self {
        self.source = source.to_string();
        self.family_element = family_element.to_string();
        self.sink = sink.to_string();
        self
    }

    pub fn algorithms<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.algorithms = names.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Names of the deployed runtime algorithms (may repeat)
    pub fn runtime<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.runtime = names.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn build(self) -> PipelineFixture {
        let mut model = ConfigurationModel::new();
        let pipeline = add(&mut model, "Pipeline", "pip", &self.name, None);
        let source = add(&mut model, "Source", "pip_src", &self.source, Some(pipeline));
        let flow_in = add(&mut model, "Flow", "pip_f1", "f1", Some(pipeline));
        let family_element =
            add(&mut model, "FamilyElement", "pip_fam", &self.family_element, Some(pipeline));
        let flow_out = add(&mut model, "Flow", "pip_f2", "f2", Some(pipeline));
        let sink = add(&mut model, "Sink", "pip_sink", &self.sink, Some(pipeline));
        let family = add(&mut model, "Family", "family", "family", None);

        let algorithms: Vec<NodeId> = self
            .algorithms
            .iter()
            .map(|name| add(&mut model, "Algorithm", &format!("alg_{}", name), name, None))
            .collect();

        let runtime_family_element =
            add(&mut model, "FamilyElement", "rt_fam", &self.family_element, None);
        let runtime_algorithms: Vec<NodeId> = self
            .runtime
            .iter()
            .enumerate()
            .map(|(i, name)| add(&mut model, "Algorithm", &format!("rt{}_{}", i, name), name, None))
            .collect();

        for id in [source, family_element, sink]
            .into_iter()
            .chain(algorithms.iter().copied())
            .chain(runtime_algorithms.iter().copied())
        {
            model.set_slot(id, "latency", Slot::unset(ValueType::Real)).unwrap();
            model.set_slot(id, "capacity", Slot::unset(ValueType::Integer)).unwrap();
            model.set_slot(id, "isValid", Slot::unset(ValueType::Boolean)).unwrap();
        }

        model.set_slot(pipeline, "sources", Slot::List(vec![source])).unwrap();
        model.set_slot(source, "output", Slot::List(vec![flow_in])).unwrap();
        model.set_slot(flow_in, "destination", Slot::Ref(family_element)).unwrap();
        model.set_slot(family_element, "family", Slot::Ref(family)).unwrap();
        model.set_slot(family_element, "output", Slot::List(vec![flow_out])).unwrap();
        model.set_slot(flow_out, "destination", Slot::Ref(sink)).unwrap();
        model.set_slot(family, "members", Slot::List(algorithms.clone())).unwrap();
        model
            .set_slot(
                runtime_family_element,
                "available",
                Slot::List(runtime_algorithms.clone()),
            )
            .unwrap();

        let provider = StaticMappingProvider::new().with(
            family_element,
            self.phase,
            vec![runtime_family_element],
        );

        PipelineFixture {
            model,
            provider,
            pipeline,
            source,
            family_element,
            sink,
            algorithms,
            runtime_algorithms,
        }
    }
}

fn add(
    model: &mut ConfigurationModel,
    type_name: &str,
    decl: &str,
    name: &str,
    parent: Option<NodeId>,
) -> NodeId {
    let id = model.add_node(type_name, decl, parent).unwrap();
    model
        .set_slot(id, "name", Slot::value(Value::Text(name.to_string())))
        .unwrap();
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder() {
        let fixture = PipelineBuilder::new("PriorityPip")
            .algorithms(&["A", "B", "C"])
            .runtime(&["C", "A"])
            .build();

        assert_eq!(fixture.algorithms.len(), 3);
        assert_eq!(fixture.runtime_algorithms.len(), 2);
        assert_eq!(fixture.model.logical_name(fixture.pipeline), Some("PriorityPip"));
        assert_eq!(fixture.model.get(fixture.sink).unwrap().parent, Some(fixture.pipeline));
    }
}
