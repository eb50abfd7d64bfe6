use crate::models::{ChangeKind, DependencyChangeEvent, ManifestSnapshot};

/// Compute the change events between two manifest snapshots.
///
/// Pure function. Events come out sorted by dependency key, so the result is
/// deterministic regardless of input construction order. Version comparison
/// is exact string inequality: `"1.0"` and `"1.0.0"` count as a change. A
/// scope change with an unchanged version is not an event.
pub fn diff(before: &ManifestSnapshot, after: &ManifestSnapshot) -> Vec<DependencyChangeEvent> {
    let mut events = Vec::new();

    for decl in after.iter() {
        match before.get(&decl.key) {
            None => events.push(DependencyChangeEvent {
                key: decl.key.clone(),
                kind: ChangeKind::Added {
                    version: decl.version.clone(),
                },
            }),
            Some(old) if old.version != decl.version => events.push(DependencyChangeEvent {
                key: decl.key.clone(),
                kind: ChangeKind::Changed {
                    old: old.version.clone(),
                    new: decl.version.clone(),
                },
            }),
            Some(_) => {}
        }
    }

    for decl in before.iter() {
        if !after.contains(&decl.key) {
            events.push(DependencyChangeEvent {
                key: decl.key.clone(),
                kind: ChangeKind::Removed {
                    version: decl.version.clone(),
                },
            });
        }
    }

    events.sort_by(|a, b| a.key.cmp(&b.key));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DependencyDeclaration, DependencyKey};

    fn snapshot(entries: &[(&str, &str, &str)]) -> ManifestSnapshot {
        entries
            .iter()
            .map(|(group, artifact, version)| DependencyDeclaration {
                key: DependencyKey::new(*group, *artifact),
                version: version.to_string(),
                scope: None,
            })
            .collect()
    }

    #[test]
    fn test_added_dependency() {
        let before = snapshot(&[]);
        let after = snapshot(&[("org.x", "lib", "1.0")]);

        let events = diff(&before, &after);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, DependencyKey::new("org.x", "lib"));
        assert_eq!(
            events[0].kind,
            ChangeKind::Added {
                version: "1.0".to_string()
            }
        );
    }

    #[test]
    fn test_removed_dependency() {
        let before = snapshot(&[("org.x", "lib", "1.0")]);
        let after = snapshot(&[]);

        let events = diff(&before, &after);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            ChangeKind::Removed {
                version: "1.0".to_string()
            }
        );
    }

    #[test]
    fn test_version_change() {
        let before = snapshot(&[("org.x", "lib", "1.0")]);
        let after = snapshot(&[("org.x", "lib", "2.0")]);

        let events = diff(&before, &after);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            ChangeKind::Changed {
                old: "1.0".to_string(),
                new: "2.0".to_string()
            }
        );
    }

    #[test]
    fn test_identity_law() {
        let s = snapshot(&[
            ("org.a", "one", "1.0"),
            ("org.b", "two", "2.0"),
            ("org.c", "three", "${three.version}"),
        ]);
        assert!(diff(&s, &s).is_empty());
    }

    #[test]
    fn test_symmetry_law() {
        let a = snapshot(&[("org.a", "kept", "1.0"), ("org.b", "gone", "3.1")]);
        let b = snapshot(&[("org.a", "kept", "2.0"), ("org.c", "new", "0.9")]);

        let forward = diff(&a, &b);
        let backward = diff(&b, &a);
        assert_eq!(forward.len(), backward.len());

        for event in &forward {
            let inverse = backward
                .iter()
                .find(|e| e.key == event.key)
                .expect("every key appears in both directions");
            match (&event.kind, &inverse.kind) {
                (ChangeKind::Added { version: v1 }, ChangeKind::Removed { version: v2 }) => {
                    assert_eq!(v1, v2)
                }
                (ChangeKind::Removed { version: v1 }, ChangeKind::Added { version: v2 }) => {
                    assert_eq!(v1, v2)
                }
                (
                    ChangeKind::Changed { old, new },
                    ChangeKind::Changed {
                        old: rev_old,
                        new: rev_new,
                    },
                ) => {
                    assert_eq!(old, rev_new);
                    assert_eq!(new, rev_old);
                }
                (a, b) => panic!("kinds are not inverses: {a:?} vs {b:?}"),
            }
        }
    }

    #[test]
    fn test_completeness_no_key_dropped() {
        let a = snapshot(&[("org.a", "x", "1"), ("org.b", "y", "2"), ("org.c", "z", "3")]);
        let b = snapshot(&[("org.b", "y", "2"), ("org.c", "z", "4"), ("org.d", "w", "5")]);

        let events = diff(&a, &b);
        // org.b:y is unchanged; everything else shows up exactly once.
        let keys: Vec<String> = events.iter().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["org.a:x", "org.c:z", "org.d:w"]);
    }

    #[test]
    fn test_events_sorted_by_key() {
        let before = snapshot(&[("org.z", "last", "1.0")]);
        let after = snapshot(&[("org.a", "first", "1.0"), ("org.m", "middle", "1.0")]);

        let keys: Vec<String> = diff(&before, &after)
            .iter()
            .map(|e| e.key.to_string())
            .collect();
        assert_eq!(keys, vec!["org.a:first", "org.m:middle", "org.z:last"]);
    }

    #[test]
    fn test_string_inequality_is_a_change() {
        // No semantic version comparison: 1.0 vs 1.0.0 is a change.
        let before = snapshot(&[("org.x", "lib", "1.0")]);
        let after = snapshot(&[("org.x", "lib", "1.0.0")]);
        assert_eq!(diff(&before, &after).len(), 1);
    }

    #[test]
    fn test_scope_only_change_is_not_an_event() {
        let mut before = ManifestSnapshot::new();
        before.insert(DependencyDeclaration {
            key: DependencyKey::new("org.x", "lib"),
            version: "1.0".to_string(),
            scope: None,
        });
        let mut after = ManifestSnapshot::new();
        after.insert(DependencyDeclaration {
            key: DependencyKey::new("org.x", "lib"),
            version: "1.0".to_string(),
            scope: Some("test".to_string()),
        });
        assert!(diff(&before, &after).is_empty());
    }
}
