#![forbid(unsafe_code)]

//! Reference scripts.

use director_core::{AnimationParams, Attrs, Op, Script, Selector, Step};

/// `[[add circle {radius: 5}]]`
#[must_use]
pub fn single_circle() -> Script {
    Script::from(vec![Step::from(Op::add(
        "circle",
        Attrs::new().with("radius", 5),
    ))])
}

/// A short lesson touching every verb.
///
/// 0. add the `#x-axis` singleton and two points
/// 1. slide both points apart (per-target payload, 1s)
/// 2. recolor the axis and hide the first point
/// 3. remove every point
/// 4. add a label
#[must_use]
pub fn lesson() -> Script {
    let slow = AnimationParams::millis(1000);
    Script::from(vec![
        Step::from(vec![
            Op::add(
                "axis",
                Attrs::new().with("id", "x-axis").with("color", "grey"),
            ),
            Op::add("point", Attrs::new().with("x", 0).with("y", 0)),
            Op::add("point", Attrs::new().with("x", 1).with("y", 0)),
        ]),
        Step::from(Op::animate(
            "point",
            vec![Attrs::new().with("x", -3), Attrs::new().with("x", 3)],
            slow,
        )),
        Step::from(vec![
            Op::set("#x-axis", Attrs::new().with("color", "black")),
            Op::set(Selector::parse("2"), Attrs::new().with("opacity", 0)),
        ]),
        Step::from(Op::remove("point").with_animation(AnimationParams::millis(400))),
        Step::from(Op::add(
            "label",
            Attrs::new().with("text", "done").with("x", 0),
        )),
    ])
}
