//! Identifier to bytecode flag table.

use tangle_frame::flags::tngl;

/// Every structural keyword recognized by the compiler.
pub const KEYWORDS: &[(&str, u8)] = &[
    // drawings
    ("drawSet", tngl::DRAWING_SET),
    ("drawAdd", tngl::DRAWING_ADD),
    ("drawSub", tngl::DRAWING_SUB),
    ("drawScale", tngl::DRAWING_SCALE),
    ("drawFilter", tngl::DRAWING_FILTER),
    // windows
    ("windowSet", tngl::WINDOW_SET),
    ("windowAdd", tngl::WINDOW_ADD),
    ("windowSub", tngl::WINDOW_SUB),
    ("windowScale", tngl::WINDOW_SCALE),
    ("windowFilter", tngl::WINDOW_FILTER),
    ("frame", tngl::FRAME),
    ("clip", tngl::CLIP),
    // animations
    ("animNone", tngl::ANIMATION_NONE),
    ("animFill", tngl::ANIMATION_FILL),
    ("animRainbow", tngl::ANIMATION_RAINBOW),
    ("animFade", tngl::ANIMATION_FADE),
    ("animProjectile", tngl::ANIMATION_PROJECTILE),
    ("animLoadingBar", tngl::ANIMATION_LOADING),
    ("animColorRoll", tngl::ANIMATION_COLOR_ROLL),
    ("animPaletteRoll", tngl::ANIMATION_PALETTE_ROLL),
    ("animInlined", tngl::ANIMATION_INL_ANI),
    ("animDefined", tngl::ANIMATION_DEFINED),
    // modifiers
    ("modifyBrightness", tngl::MODIFIER_BRIGHTNESS),
    ("modifyTimeline", tngl::MODIFIER_TIMELINE),
    ("modifyFadeIn", tngl::MODIFIER_FADE_IN),
    ("modifyFadeOut", tngl::MODIFIER_FADE_OUT),
    ("modifySwitchColors", tngl::MODIFIER_SWITCH_COLORS),
    ("modifyTimeLoop", tngl::MODIFIER_TIME_LOOP),
    ("modifyTimeScale", tngl::MODIFIER_TIME_SCALE),
    ("modifyTimeScaleSmoothed", tngl::MODIFIER_TIME_SCALE_SMOOTHED),
    ("modifyTimeChange", tngl::MODIFIER_TIME_CHANGE),
    ("modifyTimeSet", tngl::MODIFIER_TIME_SET),
    // generators
    ("genLastEventParam", tngl::GENERATOR_LAST_EVENT_VALUE),
    ("genSmoothOut", tngl::GENERATOR_SMOOTHOUT),
    ("genSine", tngl::GENERATOR_SINE),
    ("genSaw", tngl::GENERATOR_SAW),
    ("genTriangle", tngl::GENERATOR_TRIANGLE),
    ("genSquare", tngl::GENERATOR_SQUARE),
    ("genPerlinNoise", tngl::GENERATOR_PERLIN_NOISE),
    // variable operations
    ("readVariable", tngl::VARIABLE_READ),
    ("addValues", tngl::VARIABLE_ADD),
    ("subValues", tngl::VARIABLE_SUB),
    ("mulValues", tngl::VARIABLE_MUL),
    ("divValues", tngl::VARIABLE_DIV),
    ("modValues", tngl::VARIABLE_MOD),
    ("scaValue", tngl::VARIABLE_SCALE),
    ("mapValue", tngl::VARIABLE_MAP),
    // objects
    ("device", tngl::DEVICE),
    ("segment", tngl::SEGMENT),
    ("slice", tngl::SLICE),
    ("port", tngl::PORT),
    ("group", tngl::GROUP),
    ("marks", tngl::MARKS),
    // event handling
    ("catchEvent", tngl::EVENT_CATCHER),
    ("setValue", tngl::EVENT_SET_VALUE),
    ("emitAs", tngl::EVENT_EMIT_LOCAL),
    ("randomChoice", tngl::EVENT_RANDOM_CHOICE),
    ("interactive", tngl::INTERACTIVE),
    // definitions
    ("defDevice", tngl::DEFINE_DEVICE),
    ("defSegment", tngl::DEFINE_SEGMENT),
    ("defSifter", tngl::DEFINE_SIFTER),
    ("defAnimation", tngl::DEFINE_ANIMATION),
    ("defVariable", tngl::DEFINE_VARIABLE),
    ("defEmitter", tngl::DEFINE_EMITTER),
    // constants
    ("true", tngl::BOOL_TRUE),
    ("false", tngl::BOOL_FALSE),
];

/// Flag for `word`, if it is a keyword. Case-sensitive.
pub fn lookup(word: &str) -> Option<u8> {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == word)
        .map(|(_, flag)| *flag)
}
