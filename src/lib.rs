pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    CadClient, CollectOutcome, CollectSketchesUseCase, ConnectionEvent, ConnectionManager,
    ConnectionManagerBuilder, DeliverSketchUseCase, ManagerConfig, PooledProbe, ProbeStrategy,
    SequentialProbe, SketchSelector, DEFAULT_PROBE_INTERVAL,
};

pub use connector::{LazyCadClient, MockCadClient};

pub use domain::{
    sketch_bounds, sketch_centroid, transform_point, transform_sketch, ArcDirection, Backend,
    BridgeError, Constraint, Endpoint, PivotPolicy, PlaneInfo, Point2D, Primitive, SketchDocument,
    SketchInfo, StatusMap, TransformRequest,
};
