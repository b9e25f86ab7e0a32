//! 依赖图静态校验
//!
//! 基于定义声明的依赖（通常由 `#[derive(Injectable)]` 生成）做深度优先搜索，
//! 不会创建任何实例。图节点是定义身份，依赖按运行时相同的规则匹配到具体定义。

use di_abstractions::Definition;
use di_common::{DefinitionKey, DependencyError, TypeInfo};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// 依赖图校验器
pub(crate) struct DependencyGraphValidator {
    /// 定义身份 -> 声明的依赖
    graph: HashMap<DefinitionKey, Vec<DefinitionKey>>,
    /// 按类型索引，用于无名依赖的匹配
    by_type: HashMap<TypeInfo, Vec<DefinitionKey>>,
    /// 注册顺序，保证报错顺序稳定
    order: Vec<DefinitionKey>,
}

impl DependencyGraphValidator {
    pub(crate) fn new(definitions: &[Arc<Definition>]) -> Self {
        let mut graph = HashMap::new();
        let mut by_type: HashMap<TypeInfo, Vec<DefinitionKey>> = HashMap::new();
        let mut order = Vec::new();

        for definition in definitions {
            let key = definition.key().clone();
            by_type.entry(key.type_info).or_default().push(key.clone());
            order.push(key.clone());
            graph.insert(key, definition.dependencies().to_vec());
        }

        Self {
            graph,
            by_type,
            order,
        }
    }

    /// 返回发现的全部问题
    pub(crate) fn validate(&self) -> Result<(), Vec<DependencyError>> {
        let mut errors = Vec::new();
        for dependent in &self.order {
            for dependency in self.dependencies_of(dependent) {
                if let Err(error) = self.target(dependency) {
                    errors.push(DependencyError::instance_creation(dependent.clone(), error));
                }
            }
        }

        let mut visited = HashSet::new();
        for key in &self.order {
            let mut visiting = Vec::new();
            if let Err(error) = self.dfs_check(key, &mut visited, &mut visiting) {
                errors.push(error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn dependencies_of(&self, key: &DefinitionKey) -> &[DefinitionKey] {
        self.graph.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 依赖对应的定义：具名依赖精确匹配，无名依赖优先无名定义，其次唯一的具名定义
    fn target<'a>(&'a self, dependency: &'a DefinitionKey) -> Result<&'a DefinitionKey, DependencyError> {
        if self.graph.contains_key(dependency) {
            return Ok(dependency);
        }
        let not_found = || DependencyError::NoDefinitionFound {
            key: dependency.clone(),
        };
        if dependency.name.is_some() {
            return Err(not_found());
        }

        match self
            .by_type
            .get(&dependency.type_info)
            .map(Vec::as_slice)
            .unwrap_or(&[])
        {
            [] => Err(not_found()),
            [only] => Ok(only),
            many => Err(DependencyError::AmbiguousDefinition {
                type_name: dependency.type_info.name.to_string(),
                candidates: many.iter().filter_map(|k| k.name.clone()).collect(),
            }),
        }
    }

    fn dfs_check(
        &self,
        current: &DefinitionKey,
        visited: &mut HashSet<DefinitionKey>,
        visiting: &mut Vec<DefinitionKey>,
    ) -> Result<(), DependencyError> {
        if let Some(position) = visiting.iter().position(|k| k == current) {
            let chain = visiting[position..]
                .iter()
                .chain(std::iter::once(current))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DependencyError::CircularDependency { chain });
        }

        if visited.contains(current) {
            return Ok(());
        }

        visiting.push(current.clone());
        let result = self
            .dependencies_of(current)
            .iter()
            .filter_map(|dependency| self.target(dependency).ok())
            .try_for_each(|next| self.dfs_check(next, visited, visiting));
        visiting.pop();
        visited.insert(current.clone());

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::Module;

    struct A;
    struct B;
    struct C;

    fn validate(declare: impl FnOnce(&mut Module)) -> Result<(), Vec<DependencyError>> {
        let mut module = Module::new();
        declare(&mut module);
        let definitions: Vec<_> = module.into_parts().0.into_iter().map(Arc::new).collect();
        DependencyGraphValidator::new(&definitions).validate()
    }

    #[test]
    fn test_acyclic_graph_passes() {
        let result = validate(|m| {
            m.single(|_| Ok(Arc::new(A))).depends_on::<B>();
            m.single(|_| Ok(Arc::new(B))).depends_on::<C>();
            m.single(|_| Ok(Arc::new(C)));
        });

        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_dependency_reported() {
        let errors = validate(|m| {
            m.single(|_| Ok(Arc::new(A))).depends_on::<B>();
        })
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0].root_cause(),
            DependencyError::NoDefinitionFound { .. }
        ));
    }

    #[test]
    fn test_cycle_reported_once() {
        let errors = validate(|m| {
            m.single(|_| Ok(Arc::new(A))).depends_on::<B>();
            m.single(|_| Ok(Arc::new(B))).depends_on::<C>();
            m.single(|_| Ok(Arc::new(C))).depends_on::<A>();
        })
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        match &errors[0] {
            DependencyError::CircularDependency { chain } => {
                assert_eq!(chain.matches(" -> ").count(), 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_named_definitions_are_separate_nodes() {
        let result = validate(|m| {
            m.single(|_| Ok(Arc::new(A))).named("x").depends_on::<B>();
            m.single(|_| Ok(Arc::new(B))).depends_on_named::<A>("y");
            m.single(|_| Ok(Arc::new(A))).named("y");
        });

        assert!(result.is_ok());
    }

    #[test]
    fn test_named_cycle_reported() {
        let errors = validate(|m| {
            m.single(|_| Ok(Arc::new(A))).named("x").depends_on::<B>();
            m.single(|_| Ok(Arc::new(B))).depends_on_named::<A>("x");
        })
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], DependencyError::CircularDependency { .. }));
    }

    #[test]
    fn test_ambiguous_unnamed_dependency_reported() {
        let errors = validate(|m| {
            m.single(|_| Ok(Arc::new(A))).depends_on::<B>();
            m.single(|_| Ok(Arc::new(B))).named("left");
            m.single(|_| Ok(Arc::new(B))).named("right");
        })
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        match errors[0].root_cause() {
            DependencyError::AmbiguousDefinition { candidates, .. } => {
                assert_eq!(candidates, &vec!["left".to_string(), "right".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
