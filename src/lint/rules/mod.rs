//! Built-in lint rules.

pub mod circular_dependency;
pub mod malformed_step;
pub mod self_dependency;
pub mod undefined_dependency;

pub use circular_dependency::CircularDependencyRule;
pub use malformed_step::MalformedStepRule;
pub use self_dependency::SelfDependencyRule;
pub use undefined_dependency::UndefinedDependencyRule;

#[cfg(test)]
pub(crate) fn dag(steps: &[(&str, &[&str])]) -> crate::config::LoadedDag {
    use std::path::PathBuf;

    let mut dag = crate::config::LoadedDag::default();
    dag.files.push(PathBuf::from("dag/main.yml"));
    for (name, deps) in steps {
        dag.steps.insert(
            name.to_string(),
            deps.iter().map(|d| d.to_string()).collect(),
        );
        dag.sources
            .insert(name.to_string(), PathBuf::from("dag/main.yml"));
    }
    dag
}
