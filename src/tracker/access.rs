//! Derivation of the accessible lesson and module sets
//!
//! Unlocking is strictly left to right over the flattened lesson order: a
//! lesson opens once its immediate predecessor is completed, and the very
//! first lesson is always open. Module accessibility is evaluated separately
//! (first module, or predecessor module completed), so a module can be
//! accessible while none of its lessons are.

use std::collections::HashSet;

use crate::course::Course;

/// Lesson and module ids a learner may currently open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSets {
    pub lessons: HashSet<String>,
    pub modules: HashSet<String>,
}

/// Recompute access from the completed sets
pub fn compute_access(
    course: &Course,
    completed_lessons: &HashSet<String>,
    completed_modules: &HashSet<String>,
) -> AccessSets {
    let mut access = AccessSets::default();

    // The walk stops right after the first incomplete lesson
    for (_, _, lesson) in course.flattened() {
        access.lessons.insert(lesson.id.clone());
        if !completed_lessons.contains(&lesson.id) {
            break;
        }
    }

    for (idx, module) in course.modules.iter().enumerate() {
        let unlocked = idx == 0 || completed_modules.contains(&course.modules[idx - 1].id);
        if unlocked {
            access.modules.insert(module.id.clone());
        }
    }

    access
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{Lesson, Module};
    use proptest::prelude::*;

    fn course(shape: &[usize]) -> Course {
        let mut course = Course::new("c", "Course");
        for (m, count) in shape.iter().enumerate() {
            let mut module = Module::new(format!("m{}", m), format!("Module {}", m), m as i32);
            for l in 0..*count {
                module.lessons.push(Lesson::new(format!("m{}l{}", m, l), "Lesson", l as i32));
            }
            course.modules.push(module);
        }
        course
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fresh_course_unlocks_only_first_lesson() {
        let access = compute_access(&course(&[2, 2]), &HashSet::new(), &HashSet::new());
        assert_eq!(access.lessons, set(&["m0l0"]));
        assert_eq!(access.modules, set(&["m0"]));
    }

    #[test]
    fn completing_a_module_unlocks_the_next_one() {
        let access =
            compute_access(&course(&[2, 2]), &set(&["m0l0", "m0l1"]), &set(&["m0"]));
        assert_eq!(access.lessons, set(&["m0l0", "m0l1", "m1l0"]));
        assert_eq!(access.modules, set(&["m0", "m1"]));
    }

    #[test]
    fn gap_in_log_stops_the_walk() {
        // m0l1 was never completed, so m1l0 stays locked even though it is completed
        let completed = set(&["m0l0", "m1l0"]);
        let access = compute_access(&course(&[2, 2]), &completed, &HashSet::new());
        assert_eq!(access.lessons, set(&["m0l0", "m0l1"]));
        assert!(!access.lessons.contains("m1l0"));
    }

    #[test]
    fn module_can_be_accessible_without_its_lessons() {
        let access = compute_access(&course(&[2, 1, 1]), &set(&["m0l0"]), &set(&["m0", "m1"]));
        assert!(access.modules.contains("m2"));
        assert!(!access.lessons.contains("m2l0"));
    }

    #[test]
    fn empty_first_module_still_walks_into_the_next() {
        let access = compute_access(&course(&[0, 2]), &HashSet::new(), &HashSet::new());
        assert_eq!(access.lessons, set(&["m1l0"]));
    }

    fn arb_progress() -> impl Strategy<Value = (Vec<usize>, Vec<bool>)> {
        prop::collection::vec(0usize..5, 1..5).prop_flat_map(|shape| {
            let total: usize = shape.iter().sum();
            (Just(shape), prop::collection::vec(any::<bool>(), total))
        })
    }

    proptest! {
        #[test]
        fn first_lesson_is_always_accessible((shape, done) in arb_progress()) {
            let course = course(&shape);
            let completed: HashSet<String> = course
                .flattened()
                .zip(&done)
                .filter(|(_, d)| **d)
                .map(|((_, _, l), _)| l.id.clone())
                .collect();
            let access = compute_access(&course, &completed, &HashSet::new());

            if let Some((m, l)) = course.first_lesson() {
                let first = &course.modules[m].lessons[l].id;
                prop_assert!(access.lessons.contains(first));
            }
        }

        #[test]
        fn accessible_lessons_have_completed_predecessors((shape, done) in arb_progress()) {
            let course = course(&shape);
            let order: Vec<String> = course.flattened().map(|(_, _, l)| l.id.clone()).collect();
            let completed: HashSet<String> = order
                .iter()
                .zip(&done)
                .filter(|(_, d)| **d)
                .map(|(id, _)| id.clone())
                .collect();
            let access = compute_access(&course, &completed, &HashSet::new());

            for pair in order.windows(2) {
                if access.lessons.contains(&pair[1]) {
                    prop_assert!(completed.contains(&pair[0]));
                }
            }
        }
    }
}
