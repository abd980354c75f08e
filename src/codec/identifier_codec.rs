use super::classifier::{ClassifierRegistry, KeyContext, ALGORITHM_PREFIX};
use super::identifier::{Identifier, IdentifierFormat};
use super::observable::{Observable, ObservableTable};
use super::path::{DecodedPath, PathToken};
use crate::config::TelemetryConfig;
use crate::model::{ConfigurationModel, NodeId};
use crate::topology::{Phase, RuntimeMappingProvider, TopologyMapper};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Everything an [`IdentifierCodec`] needs besides the model itself.
#[derive(Debug, Clone)]
pub struct CodecSettings {
    pub format: IdentifierFormat,
    /// Category prefix whose identifiers are rewritten to runtime algorithms.
    pub algorithm_prefix: String,
    pub phase_order: Vec<Phase>,
    pub classifiers: Arc<ClassifierRegistry>,
    pub observables: Arc<ObservableTable>,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            format: IdentifierFormat::default(),
            algorithm_prefix: ALGORITHM_PREFIX.to_string(),
            phase_order: Phase::default_order(),
            classifiers: Arc::new(ClassifierRegistry::with_defaults()),
            observables: Arc::new(ObservableTable::builtin()),
        }
    }
}

impl CodecSettings {
    /// Settings from a loaded config. Configured classifiers are layered over
    /// the built-in table.
    pub fn from_config(config: &TelemetryConfig) -> Self {
        let mut classifiers = ClassifierRegistry::with_defaults();
        for (type_name, prefix) in &config.classifiers {
            classifiers.register_prefix(type_name.as_str(), prefix.as_str());
        }
        Self {
            format: IdentifierFormat {
                separator: config.separator.clone(),
                null_marker: config.null_marker.clone(),
            },
            algorithm_prefix: config.algorithm_prefix.clone(),
            phase_order: config.phase_order.clone(),
            classifiers: Arc::new(classifiers),
            observables: Arc::new(
                ObservableTable::builtin().with_aliases(&config.observable_aliases),
            ),
        }
    }
}

/// Bidirectional translation between model nodes and telemetry identifiers
/// for one configuration model.
///
/// Construction snapshots every pipeline and indexes every classifiable
/// node under its bucket key, so the codec reflects the model shape at the
/// time it was built. Rebuild it after the model changes shape.
pub struct IdentifierCodec {
    settings: CodecSettings,
    topology: TopologyMapper,
    index: HashMap<String, NodeId>,
    splits: RwLock<HashMap<String, Arc<[String]>>>,
}

impl IdentifierCodec {
    pub fn new(
        model: &ConfigurationModel,
        settings: CodecSettings,
        provider: Arc<dyn RuntimeMappingProvider>,
    ) -> Self {
        let topology = TopologyMapper::new(provider, settings.phase_order.clone());
        topology.warm_up(model);

        let mut codec = Self {
            settings,
            topology,
            index: HashMap::new(),
            splits: RwLock::new(HashMap::new()),
        };
        codec.index = codec.build_index(model);
        tracing::debug!(
            "Identifier codec ready: {} addressable elements of {} nodes",
            codec.index.len(),
            model.len()
        );
        codec
    }

    fn build_index(&self, model: &ConfigurationModel) -> HashMap<String, NodeId> {
        let mut index = HashMap::new();
        for node in model.iter() {
            let Some(key) = self.encode_node(model, node.id) else {
                continue;
            };
            match index.get(&key) {
                Some(existing) => tracing::debug!(
                    "Bucket '{}' already taken by {:?}; {:?} is not addressable",
                    key,
                    existing,
                    node.id
                ),
                None => {
                    index.insert(key, node.id);
                }
            }
        }
        index
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    pub fn topology(&self) -> &TopologyMapper {
        &self.topology
    }

    /// Identifier for `observable` on `node`, or `None` when its type has no
    /// classifier.
    ///
    /// A runtime counterpart is keyed by the design-time node it was derived
    /// from, so algorithm identifiers decode back to the same runtime node.
    pub fn encode(
        &self,
        model: &ConfigurationModel,
        node: NodeId,
        observable: Option<&Observable>,
    ) -> Option<String> {
        let node = self.topology.original_of(node).unwrap_or(node);
        let type_name = &model.get(node)?.type_name;
        let classifier = self.settings.classifiers.get(type_name)?;
        let pipeline = self
            .topology
            .enclosing_pipeline(model, node)
            .and_then(|p| model.logical_name(p));
        let ctx = KeyContext {
            model,
            pipeline,
            separator: &self.settings.format.separator,
        };
        Some(self.settings.format.with_observable(
            &classifier.prefix(type_name),
            &classifier.key(&ctx, node),
            observable,
        ))
    }

    /// Bucket identifier (`prefix SEP key`) of `node`.
    ///
    /// Runtime counterparts, and anything inside a runtime clone of a
    /// pipeline, use their declaration name. Other elements of a pipeline are
    /// qualified by the pipeline name; anything else uses its logical name.
    pub fn encode_node(&self, model: &ConfigurationModel, node: NodeId) -> Option<String> {
        let model_node = model.get(node)?;
        let classifier = self.settings.classifiers.get(&model_node.type_name)?;
        let prefix = classifier.prefix(&model_node.type_name);

        let pipeline = self.topology.enclosing_pipeline(model, node);
        let runtime = self.topology.is_mapped(node)
            || pipeline.is_some_and(|p| self.topology.is_mapped(p));
        let pipeline_name = pipeline.and_then(|p| model.logical_name(p));
        let key = if runtime {
            model_node.decl_name.clone()
        } else if pipeline_name.is_some() {
            let ctx = KeyContext {
                model,
                pipeline: pipeline_name,
                separator: &self.settings.format.separator,
            };
            classifier.key(&ctx, node)
        } else {
            model_node.logical_name().to_string()
        };
        Some(self.settings.format.bucket(&prefix, &key))
    }

    /// Node indexed under the bucket identifier `element`.
    pub fn resolve_element(&self, element: &str) -> Option<NodeId> {
        self.index.get(element).copied()
    }

    /// Number of indexed bucket identifiers.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Translate an identifier into path tokens.
    ///
    /// Algorithm identifiers are redirected to the runtime algorithm deployed
    /// for the pipeline they name: the element token is that algorithm's own
    /// bucket identifier. When no such counterpart is known the raw segments
    /// are used.
    pub fn decode(&self, model: &ConfigurationModel, identifier: &str) -> DecodedPath {
        let segments = self.split(identifier);
        let id = Identifier::new(&segments);
        let middle = id.middle();

        let rewritten = if id.prefix() == self.settings.algorithm_prefix {
            self.rewrite_algorithm(model, identifier, id)
        } else {
            None
        };
        let is_rewritten = rewritten.is_some();
        let (element, span) = match rewritten {
            // Pipeline and algorithm segments both name the runtime node.
            Some(element) => (element, 2),
            None => {
                let span = self.element_span(id.prefix(), middle);
                let element = if span == 0 {
                    id.prefix().to_string()
                } else {
                    self.settings
                        .format
                        .bucket(id.prefix(), &self.settings.format.join(&middle[..span]))
                };
                (element, span)
            }
        };
        let mut tokens = Vec::with_capacity(middle.len() + 2);
        tokens.push(PathToken::Element(element));
        tokens.extend(middle[span..].iter().cloned().map(PathToken::Slot));
        if let Some(token) = id.observable_token() {
            if token != self.settings.format.null_marker {
                tokens.push(PathToken::Observable(
                    self.settings.observables.normalize(token).to_string(),
                ));
            }
        }

        DecodedPath::new(tokens, id.is_nested(span), is_rewritten)
    }

    /// Number of distinct identifiers split so far.
    pub fn split_cache_len(&self) -> usize {
        self.splits
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn split(&self, identifier: &str) -> Arc<[String]> {
        if let Some(cached) = self
            .splits
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
        {
            return Arc::clone(cached);
        }
        let segments = self.settings.format.split(identifier);
        Arc::clone(
            self.splits
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(identifier.to_string())
                .or_insert(segments),
        )
    }

    /// Bucket identifier of the runtime algorithm addressed by
    /// `[prefix, pipeline, algorithm, rest…, observable]`.
    fn rewrite_algorithm(
        &self,
        model: &ConfigurationModel,
        identifier: &str,
        id: Identifier<'_>,
    ) -> Option<String> {
        let middle = id.middle();
        let (Some(pipeline), Some(algorithm)) = (middle.first(), middle.get(1)) else {
            tracing::warn!(
                "Algorithm identifier '{}' names no pipeline and algorithm; using raw segments",
                identifier
            );
            return None;
        };
        let Some(snapshot) = self.topology.snapshot(model, pipeline) else {
            tracing::warn!(
                "Algorithm identifier '{}': no pipeline '{}'; using raw segments",
                identifier,
                pipeline
            );
            return None;
        };
        let Some(runtime) = self.topology.algorithms(model, &snapshot).get(algorithm).copied()
        else {
            tracing::warn!(
                "Algorithm identifier '{}': no runtime algorithm '{}' in '{}'; using raw segments",
                identifier,
                algorithm,
                pipeline
            );
            return None;
        };
        match self.encode_node(model, runtime) {
            Some(element) if self.resolve_element(&element) == Some(runtime) => Some(element),
            _ => {
                tracing::warn!(
                    "Algorithm identifier '{}': runtime algorithm {:?} is not addressable; using raw segments",
                    identifier,
                    runtime
                );
                None
            }
        }
    }

    /// Longest run of leading middle segments naming an indexed element;
    /// one segment when nothing matches.
    fn element_span(&self, prefix: &str, middle: &[String]) -> usize {
        (1..=middle.len())
            .rev()
            .find(|&len| {
                let key = self
                    .settings
                    .format
                    .bucket(prefix, &self.settings.format.join(&middle[..len]));
                self.index.contains_key(&key)
            })
            .unwrap_or(middle.len().min(1))
    }
}

impl std::fmt::Debug for IdentifierCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierCodec")
            .field("indexed", &self.index_len())
            .field("split_cache", &self.split_cache_len())
            .field("topology", &self.topology)
            .finish()
    }
}
